use serde::{Deserialize, Serialize};

use super::super::domain::Drawing;
use super::config::FormatPenalties;

const ENGINEERING: &[&str] = &[
    "pdf", "dwg", "rvt", "rfa", "dgn", "dxf", "dwt", "step", "iges", "sat",
];
const THREE_D: &[&str] = &["obj", "3ds", "fbx", "skp"];
const IMAGE: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "gif"];

/// Best drawing format found in a submission, from most to least useful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatClass {
    Engineering,
    ThreeD,
    Image,
    Unrecognized,
}

impl FormatClass {
    /// Classify a drawing set by its strongest member.
    pub fn classify(drawings: &[Drawing]) -> Self {
        let matches = |formats: &[&str]| {
            drawings
                .iter()
                .any(|drawing| declares(drawing, formats))
        };

        if matches(ENGINEERING) {
            FormatClass::Engineering
        } else if matches(THREE_D) {
            FormatClass::ThreeD
        } else if matches(IMAGE) {
            FormatClass::Image
        } else {
            FormatClass::Unrecognized
        }
    }

    pub fn penalty(self, penalties: &FormatPenalties) -> u32 {
        match self {
            FormatClass::Engineering => penalties.engineering,
            FormatClass::ThreeD => penalties.three_d,
            FormatClass::Image => penalties.image,
            FormatClass::Unrecognized => penalties.unrecognized,
        }
    }

    /// Reviewer-facing note for this class.
    pub fn note(self) -> &'static str {
        match self {
            FormatClass::Engineering => "تم رفع ملفات هندسية عالية الجودة",
            FormatClass::ThreeD => "تم رفع ملفات ثلاثية الأبعاد",
            FormatClass::Image => {
                "يُنصح برفع ملفات هندسية (PDF, DWG, RVT) للحصول على دقة أفضل"
            }
            FormatClass::Unrecognized => {
                "يُنصح برفع ملفات رسومات هندسية إضافية (PDF/DWG/RVT) تشمل: المخطط المعماري، مخطط أنظمة الحريق، مخطط مسارات الإخلاء، ومخططات الرشاشات/الهوزريل؛ لتحسين جودة المراجعة"
            }
        }
    }
}

/// The declared type contains a known format tag, or the file extension is one.
fn declares(drawing: &Drawing, formats: &[&str]) -> bool {
    let file_type = drawing.file_type.to_lowercase();
    let extension = drawing
        .file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase());

    formats.iter().any(|format| {
        file_type.contains(format) || extension.as_deref() == Some(*format)
    })
}
