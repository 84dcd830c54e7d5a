/// Upper bound shared by tag, ingredient and recipe title columns.
pub const MAX_NAME_LEN: usize = 255;

/// Trims `raw` and checks it is non-empty and within `MAX_NAME_LEN` chars.
pub fn clean_name(raw: &str, field: &str) -> Result<String, String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(format!("{field} may not be blank."));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(format!("{field} may not be longer than {MAX_NAME_LEN} characters."));
    }
    Ok(name.to_string())
}
