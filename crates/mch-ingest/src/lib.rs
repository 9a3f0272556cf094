pub mod columns;
pub mod csv_table;
pub mod discovery;
pub mod error;
pub mod historical;
pub mod measurements;

pub use columns::{
    ColumnLookup, ColumnRule, FREE_TEXT_SUFFIX, GroupRule, POST_ADVANTAGES_GROUP,
    POST_DISADVANTAGES_GROUP, PRE_DIAGNOSED_GROUP, PRE_SYMPTOMS_GROUP, PostSurveyColumn,
    PreSurveyColumn, ResponseGroup, SurveyColumn,
};
pub use csv_table::{CsvRow, CsvTable, read_csv_table};
pub use discovery::{DatasetLayout, SurveyDate, list_csv_files, require_file};
pub use error::{IngestError, Result};
pub use historical::{
    HistoricalProfile, HistoricalSheetRow, read_historical_profiles, read_historical_sheet,
};
pub use measurements::{MeasurementsByPatient, parse_measurement_time, read_measurements};
