//! `GET`/`POST /user/register`: the registration form and its submission.

use rocket::{Responder, State};
use rocket::form::Form;
use rocket::response::Redirect;
use rocket_dyn_templates::{Template, context};

use crate::auth::Csrf;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::{RegistrationForm, UserForm};
use crate::registration::{Registrar, RegistrationOutcome};

pub const REGISTER_TEMPLATE: &str = "user-register";
pub const REGISTER_TITLE: &str = "Register Here";

#[derive(Responder)]
pub enum RegisterResponse {
    Page(Template),
    Redirect(Redirect),
}

#[get("/user/register")]
pub fn register_form(csrf: Csrf) -> Template {
    render_register_page(&UserForm::default(), &[], &csrf)
}

#[post("/user/register", data = "<form>")]
pub async fn register(
    registrar: &State<Registrar>,
    config: &State<AppConfig>,
    csrf: Csrf,
    form: Form<RegistrationForm>,
) -> Result<RegisterResponse, AppError> {
    let form = form.into_inner();
    csrf.verify(form.csrf_token.as_deref())?;

    match registrar.register(form).await? {
        RegistrationOutcome::Created(_) => Ok(RegisterResponse::Redirect(Redirect::to(
            config.success_redirect.clone(),
        ))),
        RegistrationOutcome::Rejected { user, errors } => Ok(RegisterResponse::Page(
            render_register_page(&user, &errors, &csrf),
        )),
    }
}

fn render_register_page(user: &UserForm, errors: &[String], csrf: &Csrf) -> Template {
    Template::render(
        REGISTER_TEMPLATE,
        context! {
            title: REGISTER_TITLE,
            user: user,
            errors_array: errors,
            csrf_token: csrf.token(),
        },
    )
}
