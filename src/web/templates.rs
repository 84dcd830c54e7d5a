use tera::Tera;

/// Builds the template registry for the admin pages. Names ending in `.html`
/// are autoescaped.
pub fn load_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("admin/base.html", include_str!("../../templates/admin/base.html")),
        ("admin/login.html", include_str!("../../templates/admin/login.html")),
        ("admin/user_list.html", include_str!("../../templates/admin/user_list.html")),
        ("admin/user_change.html", include_str!("../../templates/admin/user_change.html")),
        ("admin/user_add.html", include_str!("../../templates/admin/user_add.html")),
    ])?;
    Ok(tera)
}
