use crate::models::profile::CandidateRecord;

/// Scores as printed on the certificate.
#[derive(Debug, Clone, PartialEq)]
pub struct BestScores {
    pub slot: Option<usize>,
    pub listening: String,
    pub structure: String,
    pub reading: String,
    pub total: f32,
}

impl BestScores {
    pub fn total_display(&self) -> String {
        self.total.to_string()
    }
}

/// Keeps the first two characters of the score. This is a width convention, not rounding.
pub fn format_score(score: i32) -> String {
    score.to_string().chars().take(2).collect()
}

/// Picks the attempt with the highest total. Slots without a total count as zero and
/// never win; on equal totals the earlier slot stays.
pub fn best_scores(record: &CandidateRecord) -> BestScores {
    let mut slot = None;
    let (mut listening, mut structure, mut reading, mut total) = (0, 0, 0, 0.0_f32);

    for (idx, attempt) in record.attempts.iter().enumerate() {
        let current = attempt.total_score.unwrap_or(0.0);
        if current > total {
            slot = Some(idx);
            listening = attempt.listening.unwrap_or(0);
            structure = attempt.structure.unwrap_or(0);
            reading = attempt.reading.unwrap_or(0);
            total = current;
        }
    }

    BestScores {
        slot,
        listening: format_score(listening),
        structure: format_score(structure),
        reading: format_score(reading),
        total,
    }
}

/// Capitalises the first word character of every whitespace separated word and
/// lower-cases the rest of it: `"MALANG kota"` becomes `"Malang Kota"`.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_word = false;

    for c in input.chars() {
        if c.is_whitespace() {
            in_word = false;
            out.push(c);
        } else if in_word {
            out.extend(c.to_lowercase());
        } else if c.is_ascii_alphanumeric() || c == '_' {
            in_word = true;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }

    out
}
