use crate::common::constants::{
    ANGLE_EPSILON, DECLINATION_MAX, DONE_MARKER, RECORD_FIELD_COUNT, RIGHT_ASCENSION_MAX,
};
use crate::domain::{CandidateRecord, CoincError, IngestResult, ParameterMinima};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedCandidateFile {
    pub(crate) records: Vec<CandidateRecord>,
    pub(crate) minima: ParameterMinima,
    pub(crate) byte_count: usize,
    pub(crate) checksum: u32,
}

pub(crate) fn parse_candidate_source(name: &str, bytes: &[u8]) -> IngestResult<ParsedCandidateFile> {
    let byte_count = bytes.len();
    let checksum = bytes
        .iter()
        .fold(0_u32, |sum, byte| sum.wrapping_add(u32::from(*byte)));

    let content = std::str::from_utf8(bytes).map_err(|source| {
        CoincError::ingestion(
            "INPUT.ENCODING",
            format!("candidate file '{}' is not valid UTF-8: {}", name, source),
        )
    })?;

    let mut lines = Vec::new();
    for (offset, raw) in content.split_inclusive('\n').enumerate() {
        let Some(line) = raw.strip_suffix('\n') else {
            return Err(CoincError::ingestion(
                "INPUT.MISSING_NEWLINE",
                format!(
                    "line {} of file '{}' has no terminating newline: '{}'",
                    offset + 1,
                    name,
                    raw
                ),
            ));
        };
        lines.push(line.strip_suffix('\r').unwrap_or(line));
    }

    let Some((marker, data_lines)) = lines.split_last() else {
        return Err(CoincError::ingestion(
            "INPUT.MISSING_SENTINEL",
            format!(
                "file '{}' has no lines so is not terminated by '{}'",
                name, DONE_MARKER
            ),
        ));
    };

    if *marker != DONE_MARKER {
        return Err(CoincError::ingestion(
            "INPUT.MISSING_SENTINEL",
            format!(
                "file '{}' is not terminated by '{}' but has '{}' at line {}",
                name,
                DONE_MARKER,
                marker,
                lines.len()
            ),
        ));
    }

    let mut records = Vec::with_capacity(data_lines.len());
    let mut minima = ParameterMinima::default();
    for (offset, line) in data_lines.iter().enumerate() {
        let record = parse_record_line(name, offset + 1, line)?;
        minima.observe(&record);
        records.push(record);
    }

    Ok(ParsedCandidateFile {
        records,
        minima,
        byte_count,
        checksum,
    })
}

fn parse_record_line(name: &str, line_number: usize, line: &str) -> IngestResult<CandidateRecord> {
    let fields = line.split_whitespace().collect::<Vec<_>>();
    if fields.len() != RECORD_FIELD_COUNT {
        return Err(CoincError::ingestion(
            "INPUT.FIELD_COUNT",
            format!(
                "found {} not {} values on line {} of file '{}': '{}'",
                fields.len(),
                RECORD_FIELD_COUNT,
                line_number,
                name,
                line
            ),
        ));
    }

    let source_file_id = fields[0].parse::<i32>().map_err(|_| {
        malformed_value(name, line_number, "source file id", fields[0])
    })?;
    let mut values = [0.0_f64; RECORD_FIELD_COUNT - 1];
    let labels = [
        "frequency",
        "right ascension",
        "declination",
        "spin-down",
        "detection statistic",
    ];
    for (slot, (token, label)) in values
        .iter_mut()
        .zip(fields[1..].iter().zip(labels.iter()))
    {
        *slot = token
            .parse::<f64>()
            .map_err(|_| malformed_value(name, line_number, label, token))?;
    }

    let record = CandidateRecord {
        source_file_id,
        frequency: values[0],
        right_ascension: values[1],
        declination: values[2],
        spin_down: values[3],
        detection_statistic: values[4],
    };
    validate_record(name, line_number, &record)?;
    Ok(record)
}

fn malformed_value(name: &str, line_number: usize, label: &str, token: &str) -> CoincError {
    CoincError::ingestion(
        "INPUT.MALFORMED_RECORD",
        format!(
            "line {} of file '{}' has an unparsable {} '{}'",
            line_number, name, label, token
        ),
    )
}

fn validate_record(name: &str, line_number: usize, record: &CandidateRecord) -> IngestResult<()> {
    let finite = record.frequency.is_finite()
        && record.right_ascension.is_finite()
        && record.declination.is_finite()
        && record.spin_down.is_finite()
        && record.detection_statistic.is_finite();
    if !finite {
        return Err(invalid_record(name, line_number, "all fields must be finite"));
    }

    if record.source_file_id < 0 {
        return Err(invalid_record(name, line_number, "source file id must be non-negative"));
    }
    if record.frequency < 0.0 {
        return Err(invalid_record(name, line_number, "frequency must be non-negative"));
    }
    if record.detection_statistic < 0.0 {
        return Err(invalid_record(
            name,
            line_number,
            "detection statistic must be non-negative",
        ));
    }
    if record.right_ascension < -ANGLE_EPSILON
        || record.right_ascension > RIGHT_ASCENSION_MAX + ANGLE_EPSILON
    {
        return Err(invalid_record(
            name,
            line_number,
            &format!(
                "right ascension must lie between 0 and {:.15}",
                RIGHT_ASCENSION_MAX
            ),
        ));
    }
    if record.declination < -DECLINATION_MAX - ANGLE_EPSILON
        || record.declination > DECLINATION_MAX + ANGLE_EPSILON
    {
        return Err(invalid_record(
            name,
            line_number,
            &format!(
                "declination must lie between {:.15} and {:.15}",
                -DECLINATION_MAX, DECLINATION_MAX
            ),
        ));
    }

    Ok(())
}

fn invalid_record(name: &str, line_number: usize, detail: &str) -> CoincError {
    CoincError::ingestion(
        "INPUT.INVALID_RECORD",
        format!(
            "line {} of file '{}' has invalid values: {}",
            line_number, name, detail
        ),
    )
}
