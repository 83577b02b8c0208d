use csv::StringRecord;

use crate::errors::{AppError, AppResult};
use crate::models::domain::exam_session::AnswerValue;
use crate::models::domain::question::QuestionType;
use crate::models::dto::request::{CreateQuestionRequest, OptionInput};

/// Most option columns a row may carry: option_1..option_4.
const MAX_OPTIONS: usize = 4;

/// Parse a CSV payload into per-row results. Data rows are numbered from 2
/// (row 1 is the header); a malformed row becomes an error message and
/// parsing continues with the next row.
pub fn parse_rows(data: &[u8]) -> AppResult<Vec<(usize, Result<CreateQuestionRequest, String>)>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| AppError::ValidationError(format!("Unreadable CSV header: {}", e)))?
        .clone();

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let row_num = i + 2;
        let parsed = match record {
            Ok(record) => parse_record(&headers, &record),
            Err(e) => Err(format!("unreadable row: {}", e)),
        };
        rows.push((row_num, parsed));
    }

    Ok(rows)
}

fn field<'a>(headers: &StringRecord, record: &'a StringRecord, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .position(|h| h == name)
        .and_then(|idx| record.get(idx))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn parse_record(
    headers: &StringRecord,
    record: &StringRecord,
) -> Result<CreateQuestionRequest, String> {
    let question_text = field(headers, record, "question_text")
        .ok_or_else(|| "missing question_text".to_string())?
        .to_string();

    let raw_type = field(headers, record, "question_type").unwrap_or("MCQ");
    let question_type = match raw_type.to_uppercase().as_str() {
        "MCQ" => QuestionType::Mcq,
        "MSQ" => QuestionType::Msq,
        "NAT" => QuestionType::Nat,
        other => return Err(format!("invalid question_type '{}'", other)),
    };

    let subject = field(headers, record, "subject").unwrap_or("General").to_string();
    let topic = field(headers, record, "topic").unwrap_or("General").to_string();
    let difficulty = field(headers, record, "difficulty").map(str::to_string);

    let marks = match field(headers, record, "marks") {
        Some(raw) => Some(
            raw.parse::<f64>()
                .map_err(|_| format!("invalid marks '{}'", raw))?,
        ),
        None => None,
    };
    let negative_marks = match field(headers, record, "negative_marks") {
        Some(raw) => Some(
            raw.parse::<f64>()
                .map_err(|_| format!("invalid negative_marks '{}'", raw))?,
        ),
        None => None,
    };

    let mut options = Vec::new();
    if matches!(question_type, QuestionType::Mcq | QuestionType::Msq) {
        for i in 1..=MAX_OPTIONS {
            if let Some(text) = field(headers, record, &format!("option_{}", i)) {
                let is_correct = field(headers, record, &format!("option_{}_correct", i))
                    .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
                    .unwrap_or(false);
                options.push(OptionInput {
                    text: text.to_string(),
                    is_correct,
                });
            }
        }
    }

    // NAT rows leave the option columns blank and carry the answer in
    // correct_answer; one legacy export path put it in option_1 instead.
    let correct_answer = if question_type == QuestionType::Nat {
        let raw = field(headers, record, "correct_answer")
            .or_else(|| field(headers, record, "option_1"))
            .ok_or_else(|| "NAT row has no correct_answer".to_string())?;
        Some(AnswerValue::Text(raw.to_string()))
    } else {
        None
    };

    Ok(CreateQuestionRequest {
        question_text,
        question_type,
        subject,
        topic,
        difficulty,
        marks,
        negative_marks,
        options,
        correct_answer,
        explanation: field(headers, record, "explanation").map(str::to_string),
    })
}
