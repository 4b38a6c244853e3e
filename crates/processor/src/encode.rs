//! CSV 행 직렬화
//!
//! 분석 카탈로그(OpenCSVSerde)와 맞춘 방언을 사용합니다:
//! 구분자 `,`, 인용 문자 `"`, escape 문자 `\`. 필요한 필드만 인용하며
//! 인용 문자는 두 번 쓰지 않고 escape 문자로 처리합니다.
//! 값 안의 `\`는 `\\`로 기록되어 같은 방언으로 읽으면 원래 값이 됩니다.
//! 출력은 헤더 한 줄과 데이터 한 줄, CRLF 줄바꿈입니다.

use csv::{QuoteStyle, Terminator, WriterBuilder};

use ecrscan_core::error::StorageError;
use ecrscan_core::row::{COLUMNS, FlatRow};

/// CSV 오브젝트의 content type
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// 행을 헤더 포함 CSV 바이트로 직렬화합니다.
pub fn encode_csv(row: &FlatRow) -> Result<Vec<u8>, StorageError> {
    let mut writer = WriterBuilder::new()
        .delimiter(b',')
        .quote(b'"')
        .escape(b'\\')
        .double_quote(false)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    writer
        .write_record(COLUMNS)
        .map_err(|e| StorageError::Encode(e.to_string()))?;
    writer
        .write_record(row.values().into_iter().map(escape_backslashes))
        .map_err(|e| StorageError::Encode(e.to_string()))?;

    writer
        .into_inner()
        .map_err(|e| StorageError::Encode(e.to_string()))
}

/// writer는 인용 문자만 escape하므로 escape 문자 자체는 미리 두 번 씁니다.
fn escape_backslashes(value: String) -> String {
    if value.contains('\\') {
        value.replace('\\', "\\\\")
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csv::ReaderBuilder;

    fn sample() -> FlatRow {
        FlatRow {
            version: "0".to_owned(),
            id: "evt-1".to_owned(),
            detail_type: "ECR Image Scan".to_owned(),
            source: "aws.ecr".to_owned(),
            account: "123".to_owned(),
            time: "2024-05-01T12:00:00Z".to_owned(),
            region: "us-east-1".to_owned(),
            resources: "arn:aws:ecr:us-east-1:123:repository/app".to_owned(),
            repository_name: "app".to_owned(),
            image_digest: "sha256:abc".to_owned(),
            scan_status: "COMPLETE".to_owned(),
            severity_undefined: 0,
            severity_low: 5,
            severity_medium: 0,
            severity_high: 2,
            severity_critical: 0,
            image_tags: "v1|latest".to_owned(),
        }
    }

    fn lines(bytes: &[u8]) -> Vec<String> {
        String::from_utf8(bytes.to_vec())
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn writes_header_and_one_data_line() {
        let bytes = encode_csv(&sample()).unwrap();
        let lines = lines(&bytes);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], COLUMNS.join(","));
        assert_eq!(
            lines[1],
            "0,evt-1,ECR Image Scan,aws.ecr,123,2024-05-01T12:00:00Z,us-east-1,\
             arn:aws:ecr:us-east-1:123:repository/app,app,sha256:abc,COMPLETE,0,5,0,2,0,v1|latest"
        );
    }

    #[test]
    fn uses_crlf_terminator() {
        let bytes = encode_csv(&sample()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.ends_with("v1|latest\r\n"));
        assert_eq!(text.matches("\r\n").count(), 2);
    }

    #[test]
    fn quotes_field_containing_delimiter() {
        let mut row = sample();
        row.resources = "arn:a,arn:b".to_owned();
        let bytes = encode_csv(&row).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(",\"arn:a,arn:b\","));
    }

    #[test]
    fn escapes_quote_with_backslash() {
        let mut row = sample();
        row.scan_status = "say \"hi\"".to_owned();
        let bytes = encode_csv(&row).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(r#""say \"hi\"""#));
        assert!(!text.contains(r#""""#));
    }

    fn read_back(bytes: &[u8]) -> Vec<String> {
        let mut reader = ReaderBuilder::new()
            .escape(Some(b'\\'))
            .double_quote(false)
            .from_reader(bytes);
        assert_eq!(reader.headers().unwrap().len(), COLUMNS.len());
        let records: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 1);
        records[0].iter().map(str::to_owned).collect()
    }

    #[test]
    fn backslash_before_quote_keeps_seventeen_columns() {
        let mut row = sample();
        row.scan_status = "a\\\"b,c".to_owned();
        let bytes = encode_csv(&row).unwrap();

        let values = read_back(&bytes);
        assert_eq!(values.len(), 17);
        assert_eq!(values, row.values());
        assert_eq!(values[10], r#"a\"b,c"#);
    }

    #[test]
    fn lone_backslash_reads_back_unchanged() {
        let mut row = sample();
        row.image_tags = r"v1\|C:\tmp\".to_owned();
        let bytes = encode_csv(&row).unwrap();

        assert_eq!(read_back(&bytes), row.values());
    }

    #[test]
    fn plain_row_reads_back_unchanged() {
        let row = sample();
        assert_eq!(read_back(&encode_csv(&row).unwrap()), row.values());
    }
}
