//! BLS period codes.
//!
//! `M01`..`M12` are calendar months, `M13` is the annual average. Quarterly
//! (`Q01`..) and semi-annual (`S01`..) codes appear in other series.

/// Annual-average code. Looks like a month code but is not one.
pub const ANNUAL_AVERAGE: &str = "M13";

/// Classification of a raw period code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodCode {
    /// A calendar month, 1..=12.
    Month(u32),
    AnnualAverage,
    Other,
}

impl PeriodCode {
    pub fn parse(code: &str) -> Self {
        let code = code.trim();
        if code == ANNUAL_AVERAGE {
            return PeriodCode::AnnualAverage;
        }
        let Some(digits) = code.strip_prefix('M') else {
            return PeriodCode::Other;
        };
        if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return PeriodCode::Other;
        }
        match digits.parse::<u32>() {
            Ok(month @ 1..=12) => PeriodCode::Month(month),
            _ => PeriodCode::Other,
        }
    }

    /// Calendar month for `M01`..`M12`, `None` for everything else.
    pub fn month(&self) -> Option<u32> {
        match self {
            PeriodCode::Month(m) => Some(*m),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_month_codes_parse() {
        for m in 1..=12u32 {
            let code = format!("M{m:02}");
            assert_eq!(PeriodCode::parse(&code), PeriodCode::Month(m));
        }
    }

    #[test]
    fn annual_average_is_not_a_month() {
        assert_eq!(PeriodCode::parse("M13"), PeriodCode::AnnualAverage);
        assert_eq!(PeriodCode::parse("M13").month(), None);
    }

    #[test]
    fn other_codes_rejected() {
        for code in ["M00", "M14", "M1", "M001", "Mxx", "Q01", "S01", "A01", "", "m01"] {
            assert_eq!(PeriodCode::parse(code), PeriodCode::Other, "code {code:?}");
        }
    }
}
