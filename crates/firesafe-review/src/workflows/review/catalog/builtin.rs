use super::schema::FireCodeDef;
use super::CatalogError;

const EGYPTIAN_FIRE_CODE_JSON: &str = include_str!("../../../../rules/egyptian-fire-code.json");

/// Parse the embedded Egyptian Fire Code (126/2021) rule table.
pub fn egyptian_fire_code() -> Result<FireCodeDef, CatalogError> {
    let def: FireCodeDef = serde_json::from_str(EGYPTIAN_FIRE_CODE_JSON)?;
    Ok(def)
}
