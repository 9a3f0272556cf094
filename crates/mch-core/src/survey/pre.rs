//! Pre-delivery (intake) survey mapping.

use mch_ingest::{
    ColumnLookup, CsvRow, CsvTable, PRE_DIAGNOSED_GROUP, PRE_SYMPTOMS_GROUP, PreSurveyColumn,
    ResponseGroup,
};
use mch_model::{Answer, ContactId, PreSurveyRecord};
use tracing::{debug, info};

use super::maps::{
    CHILDREN_COUNT, HAVE_NOT, NO_SURGERY, PREGNANCY_COUNT, STILL_DRINKING, STILL_SMOKING, YES_NO,
    lookup_answer, lookup_code,
};
use super::{SurveyBatch, collect_group};
use crate::datetime::parse_date;
use crate::gestational_age::parse_ga_str;
use crate::numeric::{parse_count, parse_f64};
use crate::text_utils::strip_choice;

const DEFAULT_PREGNANCY_COUNT: &str = "1";
const DEFAULT_CHILDREN_COUNT: &str = "0";
const UNANSWERED: &str = "NA";

struct PreColumns {
    lookup: ColumnLookup<PreSurveyColumn>,
    symptoms: ResponseGroup,
    diagnosed: ResponseGroup,
}

impl PreColumns {
    fn cell<'a>(&self, row: &CsvRow<'a>, column: PreSurveyColumn) -> &'a str {
        row.get(self.lookup.index(column))
    }
}

/// Maps every row with a contact identifier into a [`PreSurveyRecord`].
pub fn map_pre_survey(table: &CsvTable) -> mch_ingest::Result<SurveyBatch<PreSurveyRecord>> {
    let columns = PreColumns {
        lookup: ColumnLookup::resolve(&table.headers)?,
        symptoms: PRE_SYMPTOMS_GROUP.resolve(&table.headers),
        diagnosed: PRE_DIAGNOSED_GROUP.resolve(&table.headers),
    };
    let missing = columns.lookup.missing();
    if !missing.is_empty() {
        info!(?missing, "pre-survey export lacks columns");
    }

    let mut records = Vec::with_capacity(table.len());
    let mut skipped = 0usize;
    for row in table.rows() {
        match map_row(&row, &columns) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }
    debug!(records = records.len(), skipped, "pre-survey mapped");
    Ok(SurveyBatch {
        records,
        rows_read: table.len(),
        skipped,
    })
}

fn map_row(row: &CsvRow<'_>, cols: &PreColumns) -> Option<PreSurveyRecord> {
    use PreSurveyColumn as C;

    let mobile = ContactId::parse(cols.cell(row, C::Contact))?;
    let ga = parse_ga_str(cols.cell(row, C::GestationalAge));

    let first_pregnancy = lookup_answer(YES_NO, cols.cell(row, C::FirstPregnancy));
    let first_delivery =
        lookup_answer(YES_NO, cols.cell(row, C::FirstDelivery)).unwrap_or(Answer::Yes);
    let last_delivery = match cols.cell(row, C::LastDeliveryDate) {
        "" => UNANSWERED.to_string(),
        value => value.to_string(),
    };

    Some(PreSurveyRecord {
        date_joined: parse_date(cols.cell(row, C::JoinedDate)),
        name: cols.cell(row, C::Name).to_string(),
        mobile,
        age: parse_count(cols.cell(row, C::Age)),
        ga_entry_str: ga.raw,
        ga_entry: ga.days,
        curr_height: parse_f64(cols.cell(row, C::Height)),
        curr_weight: parse_f64(cols.cell(row, C::Weight)),
        pre_weight: parse_f64(cols.cell(row, C::PrePregnancyWeight)),
        last_menstrual: cols.cell(row, C::LastMenstrual).to_string(),
        edd: cols.cell(row, C::EstimatedDelivery).to_string(),
        had_pregnancy: previous_from_first(first_pregnancy),
        had_delivery: previous_from_first(Some(first_delivery)),
        n_pregnancy: lookup_code(PREGNANCY_COUNT, cols.cell(row, C::PregnancyCount))
            .unwrap_or(DEFAULT_PREGNANCY_COUNT)
            .to_string(),
        n_children: lookup_code(CHILDREN_COUNT, cols.cell(row, C::ChildrenCount))
            .unwrap_or(DEFAULT_CHILDREN_COUNT)
            .to_string(),
        last_delivery,
        had_preterm: lookup_answer(HAVE_NOT, cols.cell(row, C::PreviousPreterm))
            .unwrap_or(Answer::NotApplicable),
        had_surgery: surgery_answer(cols.cell(row, C::SurgeryHistory)),
        pregnancy_symptoms: collect_group(row, &cols.symptoms),
        diagnosed_conditions: collect_group(row, &cols.diagnosed),
        smoking_history: lookup_answer(HAVE_NOT, cols.cell(row, C::SmokingHistory)),
        still_smoking: lookup_answer(STILL_SMOKING, cols.cell(row, C::StillSmoking))
            .unwrap_or(Answer::NotApplicable),
        quit_smoking: lookup_answer(YES_NO, cols.cell(row, C::QuitSmokingForPregnancy))
            .unwrap_or(Answer::NotApplicable),
        alcohol_history: lookup_answer(HAVE_NOT, cols.cell(row, C::AlcoholHistory)),
        still_drinking: lookup_answer(STILL_DRINKING, cols.cell(row, C::StillDrinking))
            .unwrap_or(Answer::NotApplicable),
        quit_drinking: lookup_answer(YES_NO, cols.cell(row, C::QuitDrinkingForPregnancy))
            .unwrap_or(Answer::NotApplicable),
        drug_history: lookup_answer(HAVE_NOT, cols.cell(row, C::DrugHistory)),
    })
}

/// "Is this your first ...?" answered No means there was a previous one.
fn previous_from_first(first: Option<Answer>) -> Answer {
    if first == Some(Answer::No) {
        Answer::Yes
    } else {
        Answer::No
    }
}

/// Any surgery answer other than "none" counts as a history; blank is unknown.
fn surgery_answer(value: &str) -> Answer {
    match strip_choice(value) {
        "" => Answer::NotApplicable,
        NO_SURGERY => Answer::No,
        _ => Answer::Yes,
    }
}
