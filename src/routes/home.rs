use rocket_dyn_templates::{Template, context};

/// Landing page; successful registrations are redirected here.
#[get("/")]
pub fn index() -> Template {
    Template::render("index", context! { title: "Welcome" })
}
