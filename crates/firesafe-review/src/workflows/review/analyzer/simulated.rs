use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::super::domain::{BuildingProfile, IssueRecord, Project, Severity};
use super::{AnalyzerError, DrawingAnalysis, DrawingAnalyzer};

/// One simulated code check: a rule reference, how likely a submission is to
/// pass it, and the fix offered when the draw says it failed.
struct CodeCheck {
    rule_id: &'static str,
    title: &'static str,
    article: &'static str,
    severity: Severity,
    pass_probability: f64,
    violation: String,
    suggested_fix: String,
}

fn required_exits(occupancy: u32, per_exit: u32) -> u32 {
    occupancy.div_ceil(per_exit).max(2)
}

/// Checks applicable to `building`, in the order the code lists them.
fn applicable_checks(building: &BuildingProfile) -> Vec<CodeCheck> {
    let occupancy = building.total_occupancy.unwrap_or(0);
    let open_space = (building.area * 0.2).round();
    let exits = required_exits(occupancy, 50);

    let mut checks = vec![
        CodeCheck {
            rule_id: "rule-3-1-1",
            title: "المسافة الدنيا بين المباني",
            article: "3.1.1",
            severity: Severity::Critical,
            pass_probability: 0.90,
            violation: "المسافة بين المباني أقل من 6 أمتار المطلوبة".to_string(),
            suggested_fix: "زيادة المسافة بين المباني إلى 6 أمتار على الأقل وفقاً للمادة 3.1.1"
                .to_string(),
        },
        CodeCheck {
            rule_id: "rule-3-2-1",
            title: "المساحات المفتوحة للطوارئ",
            article: "3.2.1",
            severity: Severity::Major,
            pass_probability: 0.85,
            violation: format!("المساحات المفتوحة غير كافية ({open_space:.0} م² مطلوبة)"),
            suggested_fix: format!(
                "توفير مساحات مفتوحة لا تقل عن {open_space:.0} م² (20% من المساحة الإجمالية)"
            ),
        },
        CodeCheck {
            rule_id: "rule-4-1-1",
            title: "عدد المخارج المطلوبة",
            article: "4.1.1",
            severity: Severity::Critical,
            pass_probability: 0.95,
            violation: format!("عدد المخارج غير كافٍ ({exits} مخرج مطلوب)"),
            suggested_fix: format!("توفير {exits} مخرج طوارئ على الأقل (مخرج لكل 50 شخص)"),
        },
    ];

    if building.floors > 1 {
        checks.push(CodeCheck {
            rule_id: "rule-4-1-2",
            title: "المخارج الطارئة في جميع الطوابق",
            article: "4.1.2",
            severity: Severity::Critical,
            pass_probability: 0.92,
            violation: "بعض الطوابق تفتقر إلى مخارج طوارئ كافية".to_string(),
            suggested_fix: "توفير مخرجين طوارئ على الأقل لكل طابق فوق الأرضي".to_string(),
        });
    }

    if building.is_use("تعليمي") {
        let student_exits = required_exits(occupancy, 25);
        checks.push(CodeCheck {
            rule_id: "rule-4-1-3",
            title: "المخارج الطارئة للمباني التعليمية",
            article: "4.1.3",
            severity: Severity::Critical,
            pass_probability: 0.95,
            violation: format!("مخارج المباني التعليمية غير كافية ({student_exits} مخرج مطلوب)"),
            suggested_fix: format!(
                "توفير {student_exits} مخرج طوارئ للمباني التعليمية (مخرج لكل 25 طالب)"
            ),
        });
    }

    checks.push(CodeCheck {
        rule_id: "rule-5-1-1",
        title: "أجهزة كشف الدخان",
        article: "5.1.1",
        severity: Severity::Major,
        pass_probability: 0.90,
        violation: "أجهزة كشف الدخان مفقودة في بعض المساحات المغلقة".to_string(),
        suggested_fix: "تركيب أجهزة كشف دخان في جميع المساحات المغلقة".to_string(),
    });
    checks.push(CodeCheck {
        rule_id: "rule-5-2-1",
        title: "أجهزة كشف الحرارة",
        article: "5.2.1",
        severity: Severity::Major,
        pass_probability: 0.85,
        violation: "أجهزة كشف الحرارة مفقودة في المطابخ أو الغرف الميكانيكية".to_string(),
        suggested_fix: "تركيب أجهزة كشف حرارة في المطابخ والغرف الميكانيكية".to_string(),
    });

    if building.area > 1000.0 {
        checks.push(CodeCheck {
            rule_id: "rule-6-1-1",
            title: "أنظمة الرشاشات التلقائية",
            article: "6.1.1",
            severity: Severity::Critical,
            pass_probability: 0.90,
            violation: "أنظمة الرشاشات التلقائية مطلوبة للمساحات الكبيرة".to_string(),
            suggested_fix: "تركيب أنظمة رشاشات تلقائية للمساحات أكبر من 1000 م²".to_string(),
        });
    }

    checks.push(CodeCheck {
        rule_id: "rule-6-2-1",
        title: "صنابير الحريق",
        article: "6.2.1",
        severity: Severity::Major,
        pass_probability: 0.88,
        violation: "صنابير الحريق مفقودة في بعض الطوابق".to_string(),
        suggested_fix: "تركيب صنابير حريق في جميع الطوابق".to_string(),
    });
    checks.push(CodeCheck {
        rule_id: "rule-7-1-1",
        title: "الإضاءة الطارئة",
        article: "7.1.1",
        severity: Severity::Major,
        pass_probability: 0.90,
        violation: "الإضاءة الطارئة مفقودة في بعض المخارج أو المسارات".to_string(),
        suggested_fix: "تركيب إضاءة طارئة في جميع المخارج والمسارات".to_string(),
    });

    checks
}

/// Probabilistic stand-in for a plan review against Egyptian Fire Code 126/2021.
///
/// Each applicable check fails with a fixed probability. Seed it for
/// reproducible runs.
pub struct SimulatedCodeAnalyzer {
    rng: Mutex<StdRng>,
}

impl SimulatedCodeAnalyzer {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    fn draw_failures(&self, checks: &[CodeCheck]) -> Vec<bool> {
        let mut rng = self.rng.lock().expect("analyzer rng mutex poisoned");
        checks
            .iter()
            .map(|check| rng.gen::<f64>() >= check.pass_probability)
            .collect()
    }

    pub fn run(&self, project: &Project) -> DrawingAnalysis {
        let checks = applicable_checks(&project.building);
        let failures = self.draw_failures(&checks);

        let mut analysis = DrawingAnalysis::default();
        let mut titles = Vec::new();
        for (check, failed) in checks.iter().zip(failures) {
            if !failed {
                continue;
            }
            match check.severity {
                Severity::Critical => analysis.critical += 1,
                Severity::Major => analysis.major += 1,
                Severity::Minor => analysis.minor += 1,
            }
            titles.push(format!("{} (المادة {})", check.title, check.article));
            analysis.findings.push(IssueRecord::non_compliant(
                check.rule_id,
                check.severity,
                check.violation.clone(),
                Some(check.suggested_fix.clone()),
            ));
        }

        let building = &project.building;
        analysis
            .notes
            .push(format!("تم تحليل المشروع: {}", project.project_name));
        analysis
            .notes
            .push(format!("نوع المبنى: {}", building.building_type));
        analysis
            .notes
            .push(format!("المساحة الإجمالية: {} م²", building.area));
        analysis.notes.push(format!("عدد الطوابق: {}", building.floors));
        if analysis.findings.is_empty() {
            analysis
                .notes
                .push("لا توجد مخالفات للكود المصري في الرسومات المرفوعة".to_string());
        } else {
            analysis.notes.push(format!(
                "تم اكتشاف {} مخالفة للكود المصري: {}",
                analysis.findings.len(),
                titles.join("، ")
            ));
        }

        analysis
    }
}

#[async_trait]
impl DrawingAnalyzer for SimulatedCodeAnalyzer {
    fn name(&self) -> &'static str {
        "simulated-code-check"
    }

    async fn analyze(&self, project: &Project) -> Result<DrawingAnalysis, AnalyzerError> {
        Ok(self.run(project))
    }
}
