//! Global-section parameters carried by the model.

use serde::{Deserialize, Serialize};

/// IGES model-space units (Global parameter 14/15).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Unit {
    /// inches
    Inch,
    /// millimeters
    #[default]
    Millimeter,
    /// feet
    Foot,
    /// miles
    Mile,
    /// meters
    Meter,
    /// kilometers
    Kilometer,
    /// thousandths of an inch
    Mil,
    /// micrometers
    Micron,
    /// centimeters
    Centimeter,
    /// millionths of an inch
    Microinch,
}

impl Unit {
    /// The Global-section unit flag.
    pub fn flag(self) -> i64 {
        match self {
            Unit::Inch => 1,
            Unit::Millimeter => 2,
            Unit::Foot => 4,
            Unit::Mile => 5,
            Unit::Meter => 6,
            Unit::Kilometer => 7,
            Unit::Mil => 8,
            Unit::Micron => 9,
            Unit::Centimeter => 10,
            Unit::Microinch => 11,
        }
    }

    /// The Global-section unit name string.
    pub fn name(self) -> &'static str {
        match self {
            Unit::Inch => "INCH",
            Unit::Millimeter => "MM",
            Unit::Foot => "FT",
            Unit::Mile => "MI",
            Unit::Meter => "M",
            Unit::Kilometer => "KM",
            Unit::Mil => "MIL",
            Unit::Micron => "UM",
            Unit::Centimeter => "CM",
            Unit::Microinch => "UIN",
        }
    }

    /// Millimeters per one of this unit, for model rescaling.
    pub fn in_millimeters(self) -> f64 {
        match self {
            Unit::Inch => 25.4,
            Unit::Millimeter => 1.0,
            Unit::Foot => 304.8,
            Unit::Mile => 1.609_344e6,
            Unit::Meter => 1000.0,
            Unit::Kilometer => 1.0e6,
            Unit::Mil => 0.0254,
            Unit::Micron => 1.0e-3,
            Unit::Centimeter => 10.0,
            Unit::Microinch => 2.54e-5,
        }
    }
}

/// The Global-section fields the entity graph needs to carry. Field numbers
/// follow the standard's Global parameter ordering; the two delimiter
/// characters and the character-level encoding belong to the host writer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobalParams {
    /// 3: product identification from the sender
    pub product_id: String,
    /// 4: file name
    pub file_name: String,
    /// 5: native system id
    pub native_system: String,
    /// 6: preprocessor version
    pub preprocessor: String,
    /// 7: bits in an integer
    pub integer_bits: u32,
    /// 8/9: single-precision magnitude and significance
    pub float_magnitude: u32,
    /// significance of single-precision reals
    pub float_significance: u32,
    /// 10/11: double-precision magnitude and significance
    pub double_magnitude: u32,
    /// significance of double-precision reals
    pub double_significance: u32,
    /// 12: product identification for the receiver
    pub receiver_id: String,
    /// 13: model space scale
    pub model_scale: f64,
    /// 14/15: units
    pub units: Unit,
    /// 16: number of line-weight gradations
    pub lineweight_grad: u32,
    /// 17: width of the maximum line weight
    pub max_lineweight: f64,
    /// 18: file creation timestamp, `YYYYMMDD.HHMMSS`
    pub timestamp: String,
    /// 19: minimum user-intended resolution
    pub min_resolution: f64,
    /// 20: approximate maximum coordinate value, `0.0` when unknown
    pub max_coordinate: f64,
    /// 21: author
    pub author: String,
    /// 22: author's organization
    pub organization: String,
    /// 23: specification version flag
    pub version: i64,
    /// 24: drafting standard flag
    pub drafting_standard: i64,
    /// 25: model creation or modification timestamp
    pub modified: String,
    /// 26: application protocol identifier
    pub application: String,
}

fn now_stamp() -> String { chrono::Local::now().format("%Y%m%d.%H%M%S").to_string() }

impl Default for GlobalParams {
    fn default() -> Self {
        let stamp = now_stamp();
        GlobalParams {
            product_id: String::new(),
            file_name: String::new(),
            native_system: "gantry".to_string(),
            preprocessor: concat!("gantry ", env!("CARGO_PKG_VERSION")).to_string(),
            integer_bits: 32,
            float_magnitude: 38,
            float_significance: 6,
            double_magnitude: 308,
            double_significance: 15,
            receiver_id: String::new(),
            model_scale: 1.0,
            units: Unit::default(),
            lineweight_grad: 1,
            max_lineweight: 0.0,
            timestamp: stamp.clone(),
            min_resolution: gantry_base::tolerance::RES_MIN,
            max_coordinate: 0.0,
            author: String::new(),
            organization: String::new(),
            version: 11,
            drafting_standard: 0,
            modified: stamp,
            application: String::new(),
        }
    }
}
