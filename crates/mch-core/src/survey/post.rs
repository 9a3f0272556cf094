//! Post-delivery survey mapping.

use mch_ingest::{
    ColumnLookup, CsvRow, CsvTable, POST_ADVANTAGES_GROUP, POST_DISADVANTAGES_GROUP,
    PostSurveyColumn, ResponseGroup,
};
use mch_model::{ContactId, PostSurveyRecord};
use tracing::{debug, info};

use super::maps::{
    CONTRACTION_AWARENESS, CodeTable, FEEDBACK_YES_NO, RECOMMENDATION, ULTRASOUND, map_choice,
};
use super::{SurveyBatch, collect_group, optional_column};
use crate::gestational_age::parse_ga_str;
use crate::text_utils::strip_choice;

struct PostColumns {
    lookup: ColumnLookup<PostSurveyColumn>,
    advantages: ResponseGroup,
    disadvantages: ResponseGroup,
}

impl PostColumns {
    fn text(&self, row: &CsvRow<'_>, column: PostSurveyColumn) -> String {
        row.get(self.lookup.index(column)).to_string()
    }

    /// Mapped closed answer; `None` when the question is absent from the export.
    fn choice(&self, row: &CsvRow<'_>, column: PostSurveyColumn, table: CodeTable) -> Option<String> {
        optional_column(row, self.lookup.index(column)).map(|value| map_choice(table, value))
    }
}

/// Maps every row with a contact identifier into a [`PostSurveyRecord`].
pub fn map_post_survey(table: &CsvTable) -> mch_ingest::Result<SurveyBatch<PostSurveyRecord>> {
    let columns = PostColumns {
        lookup: ColumnLookup::resolve(&table.headers)?,
        advantages: POST_ADVANTAGES_GROUP.resolve(&table.headers),
        disadvantages: POST_DISADVANTAGES_GROUP.resolve(&table.headers),
    };
    let missing = columns.lookup.missing();
    if !missing.is_empty() {
        info!(?missing, "post-survey export lacks columns");
    }

    let mut records = Vec::with_capacity(table.len());
    let mut skipped = 0usize;
    for row in table.rows() {
        match map_row(&row, &columns) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }
    debug!(records = records.len(), skipped, "post-survey mapped");
    Ok(SurveyBatch {
        records,
        rows_read: table.len(),
        skipped,
    })
}

fn map_row(row: &CsvRow<'_>, cols: &PostColumns) -> Option<PostSurveyRecord> {
    use PostSurveyColumn as C;

    let mobile = ContactId::parse(row.get(cols.lookup.index(C::Contact)))?;
    let ga = parse_ga_str(row.get(cols.lookup.index(C::GestationalAge)));

    Some(PostSurveyRecord {
        name: cols.text(row, C::Name),
        mobile,
        hospitalised_date: cols.text(row, C::Hospitalised),
        delivery_type: strip_choice(row.get(cols.lookup.index(C::DeliveryMethod))).to_string(),
        water_break_datetime: cols.text(row, C::WaterBreak),
        contraction_duration: cols.text(row, C::ContractionDuration),
        birthroom_duration: cols.text(row, C::BirthroomDuration),
        birthroom_interval_duration: cols.text(row, C::BirthroomInterval),
        csect_entry_time: cols.text(row, C::CSectionEntry),
        csect_reason: cols.text(row, C::CSectionReason),
        add: cols.text(row, C::ActualDeliveryDate),
        delivery_time: cols.text(row, C::DeliveryTime),
        ga_exit_str: ga.raw,
        ga_exit: ga.days,
        device_usage_reason: cols.text(row, C::UsageReason),
        device_influence: cols.choice(row, C::Influence, FEEDBACK_YES_NO),
        device_usefulness: cols.choice(row, C::Usefulness, FEEDBACK_YES_NO),
        device_advantages: collect_group(row, &cols.advantages),
        device_disadvantages: collect_group(row, &cols.disadvantages),
        increased_awareness: cols.choice(row, C::ContractionAwareness, CONTRACTION_AWARENESS),
        had_problems: cols.choice(row, C::ProblemsFaced, FEEDBACK_YES_NO),
        problems_faced: cols.text(row, C::ProblemsDescription),
        will_recommend: cols.choice(row, C::Recommend, RECOMMENDATION),
        reasons_for_recommend: cols.text(row, C::WhyRecommend),
        reasons_for_not_recommend: cols.text(row, C::WhyNotRecommend),
        had_ultrasound: cols.choice(row, C::Ultrasound, ULTRASOUND),
        informed_doctor: cols.choice(row, C::InformedDoctor, FEEDBACK_YES_NO),
        doctor_reaction: cols.text(row, C::DoctorReaction),
        improvement: cols.text(row, C::Improvement),
    })
}
