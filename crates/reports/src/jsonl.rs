//! JSONL history export
//!
//! Một Ack mỗi dòng, đúng thứ tự trong history. Đây là export để audit,
//! không phải cơ chế lưu trữ bền vững.

use crate::error::{ReportError, ReportResult};
use minibank_core::{Ack, History};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Ghi toàn bộ history ra `writer`, trả về số dòng đã ghi
pub fn write_jsonl<W: Write>(history: &History, writer: W) -> ReportResult<usize> {
    let mut writer = BufWriter::new(writer);
    let mut written = 0;
    for ack in history {
        writeln!(writer, "{}", ack.to_json()?)?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

/// Đọc lại các Ack từ JSONL; dòng trống được bỏ qua
pub fn read_jsonl<R: BufRead>(reader: R) -> ReportResult<Vec<Ack>> {
    let mut acks = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let ack = serde_json::from_str(&line).map_err(|source| ReportError::MalformedLine {
            line: index + 1,
            source,
        })?;
        acks.push(ack);
    }
    Ok(acks)
}

/// Ghi history ra file (tạo mới hoặc ghi đè)
pub fn write_history_file(history: &History, path: &Path) -> ReportResult<usize> {
    let file = File::create(path)?;
    write_jsonl(history, file)
}

/// Đọc history từ file JSONL
pub fn read_history_file(path: &Path) -> ReportResult<Vec<Ack>> {
    let file = File::open(path)?;
    read_jsonl(BufReader::new(file))
}
