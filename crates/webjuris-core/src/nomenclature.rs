//! Classification codes ("nomenclatures") that categorise a case by legal domain.
//!
//! The table is fixed at build time. The second segment of every case number
//! is one of these codes.

/// One entry of the classification table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationCode {
    pub code: &'static str,
    pub label: &'static str,
    pub arabic_label: &'static str,
}

const CODES: &[ClassificationCode] = &[
    ClassificationCode {
        code: "1501",
        label: "Conflits du travail",
        arabic_label: "نزاعات الشغل",
    },
    ClassificationCode {
        code: "1502",
        label: "Affaires civiles",
        arabic_label: "القضايا المدنية",
    },
    ClassificationCode {
        code: "1503",
        label: "Affaires commerciales",
        arabic_label: "القضايا التجارية",
    },
    ClassificationCode {
        code: "1504",
        label: "Affaires familiales",
        arabic_label: "قضايا الأسرة",
    },
    ClassificationCode {
        code: "1505",
        label: "Affaires pénales",
        arabic_label: "القضايا الجنائية",
    },
    ClassificationCode {
        code: "1506",
        label: "Affaires administratives",
        arabic_label: "القضايا الإدارية",
    },
    ClassificationCode {
        code: "1507",
        label: "Affaires foncières",
        arabic_label: "القضايا العقارية",
    },
    ClassificationCode {
        code: "1508",
        label: "Successions",
        arabic_label: "المواريث",
    },
];

/// Every known classification, in code order.
pub fn all() -> &'static [ClassificationCode] {
    CODES
}

/// Look up a classification by its exact code.
pub fn find(code: &str) -> Option<&'static ClassificationCode> {
    let code = code.trim();
    CODES.iter().find(|c| c.code == code)
}

pub fn is_known(code: &str) -> bool {
    find(code).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_and_unique() {
        let codes: Vec<&str> = all().iter().map(|c| c.code).collect();
        let mut sorted = codes.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(codes, sorted);
        assert_eq!(codes.len(), 8);
    }

    #[test]
    fn find_by_code() {
        let family = find("1504").unwrap();
        assert_eq!(family.label, "Affaires familiales");
        assert_eq!(find(" 1508 ").unwrap().label, "Successions");
        assert!(find("9999").is_none());
        assert!(!is_known(""));
    }
}
