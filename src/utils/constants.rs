/// Raw source file names as they come out of the toll data archive
pub const VEHICLE_DATA_FILE: &str = "vehicle-data.csv";
pub const TOLLPLAZA_DATA_FILE: &str = "tollplaza-data.tsv";
pub const PAYMENT_DATA_FILE: &str = "payment-data.txt";

/// Intermediate and final file names
pub const CSV_EXTRACT_FILE: &str = "csv_data.csv";
pub const TSV_EXTRACT_FILE: &str = "tsv_data.csv";
pub const FIXED_WIDTH_EXTRACT_FILE: &str = "fixed_width_data.csv";
pub const CONSOLIDATED_FILE: &str = "extracted_data.csv";
pub const TRANSFORMED_FILE: &str = "transformed_data.csv";

/// Column names
pub const COL_ROWID: &str = "Rowid";
pub const COL_TIMESTAMP: &str = "Timestamp";
pub const COL_VEHICLE_NUMBER: &str = "Anonymized Vehicle number";
pub const COL_VEHICLE_TYPE: &str = "Vehicle type";
pub const COL_AXLES: &str = "Number of axles";
pub const COL_TOLLPLAZA_ID: &str = "Tollplaza id";
pub const COL_TOLLPLAZA_CODE: &str = "Tollplaza code";
pub const COL_PAYMENT_CODE: &str = "Type of Payment code";
pub const COL_VEHICLE_CODE: &str = "Vehicle Code";

pub const CSV_EXTRACT_COLUMNS: [&str; 4] = [
    COL_ROWID,
    COL_TIMESTAMP,
    COL_VEHICLE_NUMBER,
    COL_VEHICLE_TYPE,
];
pub const TSV_EXTRACT_COLUMNS: [&str; 3] = [COL_AXLES, COL_TOLLPLAZA_ID, COL_TOLLPLAZA_CODE];
pub const FIXED_WIDTH_EXTRACT_COLUMNS: [&str; 2] = [COL_PAYMENT_CODE, COL_VEHICLE_CODE];

/// Consolidated column order: CSV extract, TSV extract, fixed-width extract
pub const CONSOLIDATED_COLUMNS: [&str; 9] = [
    COL_ROWID,
    COL_TIMESTAMP,
    COL_VEHICLE_NUMBER,
    COL_VEHICLE_TYPE,
    COL_AXLES,
    COL_TOLLPLAZA_ID,
    COL_TOLLPLAZA_CODE,
    COL_PAYMENT_CODE,
    COL_VEHICLE_CODE,
];

/// Number of leading CSV fields kept by the CSV extractor
pub const CSV_PROJECTED_FIELDS: usize = 4;

/// TSV field indices kept by the TSV extractor (0-based)
pub const TSV_PROJECTED_INDICES: [usize; 3] = [4, 5, 6];

/// Character ranges sliced by the fixed-width extractor
pub const PAYMENT_CODE_RANGE: std::ops::Range<usize> = 50..70;
pub const VEHICLE_CODE_RANGE: std::ops::Range<usize> = 70..90;

/// Processing defaults
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
pub const DEFAULT_CONFIG_FILE: &str = "toll-etl.toml";
pub const ENV_PREFIX: &str = "TOLL_ETL";
