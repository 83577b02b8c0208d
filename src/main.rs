use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use examsim_server::{
    app_state::AppState, auth::AuthMiddleware, config::Config, handlers,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    if std::env::var("APP_ENV").is_ok_and(|v| v.eq_ignore_ascii_case("production")) {
        config.validate_for_production();
    }

    let host = config.web_server_host.clone();
    let port = config.web_server_port;

    let state = AppState::new(config)
        .await
        .expect("failed to initialise application state");

    log::info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::from(state.jwt_service.clone()))
            .wrap(Logger::default())
            .wrap(cors)
            // public surface
            .service(handlers::health_check)
            .service(handlers::auth_handler::register)
            .service(handlers::auth_handler::login)
            .service(handlers::question_handler::get_shared_question)
            // bearer-token surface
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .service(handlers::auth_handler::me)
                    .service(handlers::exam_config_handler::list_exams)
                    .service(handlers::exam_config_handler::create_exam_config)
                    .service(handlers::exam_config_handler::admin_list_exam_configs)
                    .service(handlers::exam_config_handler::delete_exam_config)
                    .service(handlers::exam_handler::start_exam)
                    .service(handlers::exam_handler::get_exam_session)
                    .service(handlers::exam_handler::get_exam_question)
                    .service(handlers::exam_handler::submit_answer)
                    .service(handlers::exam_handler::submit_exam)
                    .service(handlers::exam_handler::get_exam_result)
                    .service(handlers::question_handler::create_question)
                    .service(handlers::question_handler::list_questions)
                    .service(handlers::question_handler::get_question)
                    .service(handlers::question_handler::update_question)
                    .service(handlers::question_handler::delete_question)
                    .service(handlers::question_handler::share_question)
                    .service(handlers::question_handler::admin_create_question)
                    .service(handlers::question_handler::admin_list_questions)
                    .service(handlers::question_handler::admin_delete_question)
                    .service(handlers::upload_handler::upload_csv)
                    .service(handlers::upload_handler::preview_csv)
                    .service(handlers::ai_handler::explain_question)
                    .service(handlers::ai_handler::categorize_question)
                    .service(handlers::ai_handler::ask_tutor)
                    .service(handlers::ai_handler::generate_questions),
            )
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
