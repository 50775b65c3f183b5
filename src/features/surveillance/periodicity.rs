//! Next control date resolution for recurring inspections.
//!
//! Periodicity labels are free text typed by users ("Mensuel", "Tous les 6 mois",
//! "Contrôle annuel"). [`Cadence::classify`] maps a label onto a closed set of
//! cadences using ordered keyword rules, first match wins. [`Cadence::advance`]
//! does the calendar arithmetic and knows nothing about labels.
//!
//! Month and year steps clamp to the last day of the target month:
//! 2025-01-31 + 1 month = 2025-02-28, 2024-02-29 + 1 year = 2025-02-28.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::SurveillanceError;

/// Recognised inspection cadences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

/// Cadence applied when a label matches none of the keyword rules
pub const FALLBACK_CADENCE: Cadence = Cadence::Monthly;

impl Cadence {
    /// Best-effort classification of a periodicity label.
    ///
    /// Returns `None` when no rule matches. The rules are plain substring tests on
    /// the lower-cased label, so "Sur demande" classifies as annual ("an") and
    /// "Tous les 36 mois" as quarterly ("3").
    pub fn classify(label: &str) -> Option<Cadence> {
        let lower = label.trim().to_lowercase();

        if lower.contains("jour") || lower.contains("quotidien") {
            Some(Cadence::Daily)
        } else if lower.contains("semaine") || lower.contains("hebdo") {
            Some(Cadence::Weekly)
        } else if lower.contains("mensuel") || lower == "mois" {
            Some(Cadence::Monthly)
        } else if lower.contains("trimestriel") || lower.contains('3') {
            Some(Cadence::Quarterly)
        } else if lower.contains('6') {
            Some(Cadence::SemiAnnual)
        } else if lower.contains("annuel") || lower.contains("an") {
            Some(Cadence::Annual)
        } else {
            None
        }
    }

    /// Classify a label, falling back to [`FALLBACK_CADENCE`].
    ///
    /// Only an empty label is rejected; any other text resolves to a cadence.
    pub fn resolve(label: &str) -> Result<Cadence, SurveillanceError> {
        if label.is_empty() {
            return Err(SurveillanceError::InvalidArgument(
                "periodicity must not be empty".to_string(),
            ));
        }

        Ok(Self::classify(label).unwrap_or(FALLBACK_CADENCE))
    }

    /// Date of the next control after one performed on `date`
    pub fn advance(self, date: NaiveDate) -> Result<NaiveDate, SurveillanceError> {
        let next = match self {
            Cadence::Daily => date.checked_add_days(Days::new(1)),
            Cadence::Weekly => date.checked_add_days(Days::new(7)),
            Cadence::Monthly => date.checked_add_months(Months::new(1)),
            Cadence::Quarterly => date.checked_add_months(Months::new(3)),
            Cadence::SemiAnnual => date.checked_add_months(Months::new(6)),
            Cadence::Annual => date.checked_add_months(Months::new(12)),
        };

        next.ok_or_else(|| {
            SurveillanceError::InvalidArgument(format!(
                "next due date after {} is out of the supported calendar range",
                date
            ))
        })
    }

    /// Approximate interval in days, used to judge delays between controls
    pub fn nominal_days(self) -> u32 {
        match self {
            Cadence::Daily => 1,
            Cadence::Weekly => 7,
            Cadence::Monthly => 30,
            Cadence::Quarterly => 90,
            Cadence::SemiAnnual => 180,
            Cadence::Annual => 365,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Cadence::Daily => "daily",
            Cadence::Weekly => "weekly",
            Cadence::Monthly => "monthly",
            Cadence::Quarterly => "quarterly",
            Cadence::SemiAnnual => "semi_annual",
            Cadence::Annual => "annual",
        }
    }
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Next due date for a control completed on `completion_date`
pub fn next_due_date(
    completion_date: NaiveDate,
    periodicity: &str,
) -> Result<NaiveDate, SurveillanceError> {
    Cadence::resolve(periodicity)?.advance(completion_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rule_order() {
        assert_eq!(Cadence::classify("Journalier"), Some(Cadence::Daily));
        assert_eq!(Cadence::classify("Quotidien"), Some(Cadence::Daily));
        assert_eq!(Cadence::classify("Hebdomadaire"), Some(Cadence::Weekly));
        assert_eq!(Cadence::classify("Toutes les semaines"), Some(Cadence::Weekly));
        assert_eq!(Cadence::classify("Mensuel"), Some(Cadence::Monthly));
        assert_eq!(Cadence::classify("MOIS"), Some(Cadence::Monthly));
        assert_eq!(Cadence::classify("Trimestriel"), Some(Cadence::Quarterly));
        assert_eq!(Cadence::classify("Tous les 3 mois"), Some(Cadence::Quarterly));
        assert_eq!(Cadence::classify("Tous les 6 mois"), Some(Cadence::SemiAnnual));
        assert_eq!(Cadence::classify("Annuel"), Some(Cadence::Annual));
        assert_eq!(Cadence::classify("1 an"), Some(Cadence::Annual));
    }

    #[test]
    fn test_first_match_wins() {
        // "jour" outranks "semaine"
        assert_eq!(Cadence::classify("Semaine de 5 jours"), Some(Cadence::Daily));
        // "mensuel" outranks "3"
        assert_eq!(Cadence::classify("Mensuel (3 relevés)"), Some(Cadence::Monthly));
        // "3" outranks "6"
        assert_eq!(Cadence::classify("36 mois"), Some(Cadence::Quarterly));
        // bare substring rules
        assert_eq!(Cadence::classify("Sur demande"), Some(Cadence::Annual));
        assert_eq!(Cadence::classify("Bimensuel"), Some(Cadence::Monthly));
    }

    #[test]
    fn test_mois_must_match_whole_label() {
        assert_eq!(Cadence::classify("mois"), Some(Cadence::Monthly));
        assert_eq!(Cadence::classify("tous les mois"), None);
    }

    #[test]
    fn test_unrecognised_label_falls_back_to_monthly() {
        for label in ["Ponctuel", "xyz", "Semestriel", "tous les mois", "?"] {
            assert_eq!(Cadence::classify(label), None, "label {label:?}");
            assert_eq!(
                next_due_date(date(2025, 3, 10), label).unwrap(),
                date(2025, 4, 10),
                "label {label:?}"
            );
        }
    }

    #[test]
    fn test_weekly_labels_add_seven_days() {
        for label in ["semaine", "SEMAINE", "1 fois par semaine", "Toutes les 2 Semaines"] {
            assert_eq!(
                next_due_date(date(2025, 12, 29), label).unwrap(),
                date(2026, 1, 5),
                "label {label:?}"
            );
        }
    }

    #[test]
    fn test_daily() {
        assert_eq!(
            next_due_date(date(2024, 2, 28), "Quotidien").unwrap(),
            date(2024, 2, 29)
        );
    }

    #[test]
    fn test_quarterly_scenario() {
        assert_eq!(
            next_due_date(date(2025, 1, 15), "Trimestriel").unwrap(),
            date(2025, 4, 15)
        );
    }

    #[test]
    fn test_month_end_clamps_to_last_day() {
        assert_eq!(
            next_due_date(date(2025, 1, 31), "Mensuel").unwrap(),
            date(2025, 2, 28)
        );
        assert_eq!(
            next_due_date(date(2024, 1, 31), "Mensuel").unwrap(),
            date(2024, 2, 29)
        );
        assert_eq!(
            next_due_date(date(2025, 8, 31), "Tous les 6 mois").unwrap(),
            date(2026, 2, 28)
        );
        assert_eq!(
            next_due_date(date(2025, 11, 30), "Trimestriel").unwrap(),
            date(2026, 2, 28)
        );
    }

    #[test]
    fn test_annual_from_leap_day() {
        assert_eq!(
            next_due_date(date(2024, 2, 29), "Annuel").unwrap(),
            date(2025, 2, 28)
        );
        assert_eq!(
            next_due_date(date(2025, 6, 1), "Annuel").unwrap(),
            date(2026, 6, 1)
        );
    }

    #[test]
    fn test_empty_label_is_invalid() {
        assert!(matches!(
            next_due_date(date(2025, 1, 1), ""),
            Err(SurveillanceError::InvalidArgument(_))
        ));
        // blank but non-empty text takes the fallback
        assert_eq!(Cadence::resolve("   "), Ok(FALLBACK_CADENCE));
    }

    #[test]
    fn test_out_of_range_is_invalid() {
        assert!(matches!(
            next_due_date(NaiveDate::MAX, "Quotidien"),
            Err(SurveillanceError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_deterministic() {
        let first = next_due_date(date(2025, 5, 17), "Contrôle hebdo");
        let second = next_due_date(date(2025, 5, 17), "Contrôle hebdo");
        assert_eq!(first, second);
        assert_eq!(first.unwrap(), date(2025, 5, 24));
    }

    #[test]
    fn test_nominal_days_and_names() {
        assert_eq!(Cadence::Quarterly.nominal_days(), 90);
        assert_eq!(Cadence::SemiAnnual.to_string(), "semi_annual");
        assert_eq!(
            serde_json::to_value(Cadence::SemiAnnual).unwrap(),
            serde_json::json!("semi_annual")
        );
    }
}
