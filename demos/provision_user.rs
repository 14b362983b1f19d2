use pkauth::secret;

/// Generates a credential for a new user the way an operator would: a
/// random password plus the hash to store server-side.
fn main() {
    let password = secret::generate_password(16, true);
    let encoded = secret::hash_password(&password);

    println!("password: {password}");
    println!("stored:   {encoded}");

    assert!(secret::verify_password(&password, &encoded));
}
