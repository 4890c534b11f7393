pub mod case;
pub mod case_number;
pub mod courts;
pub mod dates;
pub mod draft;
pub mod filter;
pub mod nomenclature;
pub mod normalize;

pub use case::{CaseRecord, CaseStatus, DecisionSummary, NOT_AVAILABLE, ParseLabelError, Priority};
pub use case_number::{CaseNumber, case_number_taken, next_case_number, next_case_number_in};
pub use dates::{ConvertedDate, convert_date, convert_date_at};
pub use draft::{CaseDraft, CasePatch, DraftError, DraftField, ValidationErrors};
pub use filter::{CaseQuery, StatusCounts, StatusFilter, filter_cases, status_counts};
pub use nomenclature::ClassificationCode;
pub use normalize::{RawRecord, RelatedDecision, RelatedParty, Relations, normalize, normalize_at, normalize_with_relations};
