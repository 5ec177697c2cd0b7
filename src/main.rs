#[rocket::launch]
fn rocket() -> _ {
    registration_server::rocket()
}
