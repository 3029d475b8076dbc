//! Static region tables

/// Cloud region → grid zone, in ranking tie-break order
pub const REGION_ZONES: &[(&str, &str)] = &[
    // US
    ("us-east-1", "US-MIDW-PJM"),
    ("us-east-2", "US-MIDW-MISO"),
    ("us-west-1", "US-CAL-CISO"),
    ("us-west-2", "US-NW-PACW"),
    // Canada
    ("ca-central-1", "CA-QC"),
    ("ca-west-1", "CA-AB"),
    // Europe
    ("eu-west-1", "IE"),
    ("eu-west-2", "GB"),
    ("eu-west-3", "FR"),
    ("eu-central-1", "DE"),
    ("eu-central-2", "CH"),
    ("eu-north-1", "SE"),
    ("eu-south-1", "IT-NO"),
    ("eu-south-2", "ES"),
    // Asia Pacific
    ("ap-south-1", "IN-WE"),
    ("ap-south-2", "IN-SO"),
    ("ap-northeast-1", "JP-TK"),
    ("ap-northeast-2", "KR"),
    ("ap-northeast-3", "JP-KN"),
    ("ap-southeast-1", "SG"),
    ("ap-southeast-2", "AUS-NSW"),
    ("ap-southeast-3", "ID-JW"),
    ("ap-southeast-4", "AUS-VIC"),
    ("ap-east-1", "HK"),
    // Middle East
    ("me-south-1", "AE"),
    ("me-central-1", "IL"),
    // South America
    ("sa-east-1", "BR-CS"),
    // Africa
    ("af-south-1", "ZA"),
];

/// Intensity used for zones missing from [`FALLBACK_INTENSITIES`]
pub const DEFAULT_FALLBACK_INTENSITY: f64 = 400.0;

/// Typical grid-mix intensity per zone (gCO2eq/kWh), used when live
/// telemetry is unavailable. Covers every zone in [`REGION_ZONES`].
pub const FALLBACK_INTENSITIES: &[(&str, f64)] = &[
    ("CA-QC", 30.0),
    ("SE", 35.0),
    ("CH", 50.0),
    ("FR", 60.0),
    ("US-NW-PACW", 85.0),
    ("BR-CS", 90.0),
    ("ES", 150.0),
    ("GB", 250.0),
    ("US-CAL-CISO", 260.0),
    ("IE", 280.0),
    ("IT-NO", 300.0),
    ("DE", 380.0),
    ("JP-KN", 420.0),
    ("US-MIDW-PJM", 420.0),
    ("KR", 430.0),
    ("US-MIDW-MISO", 450.0),
    ("IL", 460.0),
    ("JP-TK", 470.0),
    ("SG", 480.0),
    ("AE", 520.0),
    ("CA-AB", 540.0),
    ("AUS-VIC", 600.0),
    ("HK", 620.0),
    ("IN-SO", 630.0),
    ("IN-WE", 650.0),
    ("AUS-NSW", 650.0),
    ("ID-JW", 700.0),
    ("ZA", 900.0),
];

/// UTC hours when carbon intensity is typically lowest
pub const LOW_CARBON_HOURS: &[(&str, &[u8])] = &[
    ("us-west-2", &[6, 7, 8, 9, 10, 11, 12, 13, 14]),
    ("eu-west-1", &[10, 11, 12, 13, 14, 15, 16]),
    ("ca-central-1", &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]),
    ("eu-north-1", &[9, 10, 11, 12, 13, 14, 15]),
    ("sa-east-1", &[11, 12, 13, 14, 15, 16, 17]),
];
