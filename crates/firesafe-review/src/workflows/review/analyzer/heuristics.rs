use async_trait::async_trait;

use super::super::domain::{Drawing, Project};
use super::{AnalyzerError, DrawingAnalysis, DrawingAnalyzer};

const ARCHITECTURAL: &[&str] = &["arch", "architect", "architectural", "معماري"];
const FIRE_SYSTEMS: &[&str] = &["fire", "firefighting", "حريق", "حماية"];
const EXITS: &[&str] = &["exit", "exits", "evac", "اخلاء", "مخارج"];
const SPRINKLERS: &[&str] = &["sprinkler", "sprinklers", "رشاش", "رشاشات"];
const HYDRANTS: &[&str] = &["hydrant", "hydrants", "hose", "reel", "صنابير"];

const MIN_DETAILED_FILE_SIZE: u64 = 50 * 1024;
const SPRINKLER_AREA_THRESHOLD: f64 = 1000.0;
const COMMERCIAL: &str = "تجاري";
const INDUSTRIAL: &str = "صناعي";

/// Lowercase file-name tokens split on `_`, `-`, `.` and whitespace.
fn name_tokens(file_name: &str) -> Vec<String> {
    file_name
        .to_lowercase()
        .split(|ch: char| ch == '_' || ch == '-' || ch == '.' || ch.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn mentions(tokens: &[String], keywords: &[&str]) -> bool {
    tokens
        .iter()
        .any(|token| keywords.contains(&token.as_str()))
}

#[derive(Default)]
struct PlanCoverage {
    architectural: bool,
    fire_systems: bool,
    exits: bool,
    sprinklers: bool,
    hydrants: bool,
    vector_files: usize,
    undersized_files: usize,
}

impl PlanCoverage {
    fn survey(drawings: &[Drawing]) -> Self {
        let mut coverage = Self::default();
        for drawing in drawings {
            let tokens = name_tokens(&drawing.file_name);
            coverage.architectural |= mentions(&tokens, ARCHITECTURAL);
            coverage.fire_systems |= mentions(&tokens, FIRE_SYSTEMS);
            coverage.exits |= mentions(&tokens, EXITS);
            coverage.sprinklers |= mentions(&tokens, SPRINKLERS);
            coverage.hydrants |= mentions(&tokens, HYDRANTS);

            let file_type = drawing.file_type.to_lowercase();
            if file_type.contains("pdf") || file_type.contains("dwg") {
                coverage.vector_files += 1;
            }
            if drawing.file_size > 0 && drawing.file_size < MIN_DETAILED_FILE_SIZE {
                coverage.undersized_files += 1;
            }
        }
        coverage
    }
}

/// File-name keyword survey of the uploaded plan set.
///
/// Looks for the essential plans a fire-safety submission should carry
/// (architectural, fire systems, evacuation routes, sprinklers, hydrants)
/// purely from file names, types and sizes.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordHeuristicAnalyzer;

impl KeywordHeuristicAnalyzer {
    pub fn survey(&self, project: &Project) -> DrawingAnalysis {
        let mut analysis = DrawingAnalysis::default();

        if project.drawings.is_empty() {
            analysis.critical += 1;
            analysis
                .missing_essentials
                .push("عدم وجود أية رسومات".to_string());
            analysis
                .notes
                .push("لا توجد رسومات مرفوعة للمشروع".to_string());
            return analysis;
        }

        let coverage = PlanCoverage::survey(&project.drawings);
        let building = &project.building;
        let commercial_or_industrial =
            building.building_type.contains(COMMERCIAL) || building.building_type.contains(INDUSTRIAL);

        if coverage.vector_files == 0 {
            analysis.critical += 1;
            analysis.missing_essentials.push("ملفات PDF/DWG".to_string());
            analysis
                .notes
                .push("لا يوجد ملف رسومات هندسية بصيغة PDF/DWG".to_string());
        }
        if !coverage.architectural {
            analysis.major += 1;
            analysis
                .missing_essentials
                .push("المخطط المعماري".to_string());
            analysis.notes.push("لا يوجد مخطط معماري أساسي".to_string());
        }
        if !coverage.fire_systems {
            analysis.critical += 1;
            analysis
                .missing_essentials
                .push("مخطط أنظمة الحريق".to_string());
            analysis
                .notes
                .push("لا يوجد مخطط أنظمة الحماية من الحريق".to_string());
        }
        if !coverage.exits {
            analysis.major += 1;
            analysis
                .notes
                .push("لا يوجد مخطط مسارات الإخلاء ومخارج الطوارئ".to_string());
        }
        if !coverage.sprinklers
            && building.area >= SPRINKLER_AREA_THRESHOLD
            && commercial_or_industrial
        {
            analysis.major += 1;
            analysis.notes.push(
                "ينبغي إرفاق مخطط شبكة الرشاشات للمساحات الكبيرة التجارية/الصناعية".to_string(),
            );
        }
        if !coverage.hydrants && commercial_or_industrial {
            analysis.minor += 1;
            analysis
                .notes
                .push("يفضل مخطط صنابير/خراطيم الحريق (hose reel/hydrants)".to_string());
        }
        if coverage.undersized_files > 0 {
            analysis.major += 1;
            analysis
                .notes
                .push("بعض الملفات صغيرة جداً وقد لا تحتوي على تفاصيل كافية".to_string());
        }

        analysis
    }
}

#[async_trait]
impl DrawingAnalyzer for KeywordHeuristicAnalyzer {
    fn name(&self) -> &'static str {
        "keyword-heuristics"
    }

    async fn analyze(&self, project: &Project) -> Result<DrawingAnalysis, AnalyzerError> {
        Ok(self.survey(project))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_split_on_separators() {
        assert_eq!(
            name_tokens("Fire_Plan-Level.2 final.PDF"),
            vec!["fire", "plan", "level", "2", "final", "pdf"]
        );
    }

    #[test]
    fn keyword_match_is_whole_token() {
        let tokens = name_tokens("firewall_layout.pdf");
        assert!(!mentions(&tokens, FIRE_SYSTEMS));
        let tokens = name_tokens("مخطط_حريق.pdf");
        assert!(mentions(&tokens, FIRE_SYSTEMS));
    }
}
