//! CLI tool to produce the admin password digest.
//!
//! Usage:
//!   cargo run --bin hash-admin-password -- "my password"
//!   cargo run --bin hash-admin-password            # generates a random password

use std::env;

use folio_lib::auth::hash_password;
use uuid::Uuid;

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    let (password, generated) = match args.as_slice() {
        [] => (generate_password(), true),
        [flag] if flag == "--help" || flag == "-h" => {
            print_usage();
            return;
        }
        [password] => (password.clone(), false),
        _ => {
            eprintln!("Error: expected at most one argument");
            print_usage();
            std::process::exit(1);
        }
    };

    if password.is_empty() {
        eprintln!("Error: password must not be empty");
        std::process::exit(1);
    }

    println!();
    println!("════════════════════════════════════════════════════════════════");
    println!("  Admin Password Digest");
    println!("════════════════════════════════════════════════════════════════");
    println!();
    if generated {
        println!("  Password: {}", password);
        println!();
    }
    println!("  BLOG_ADMIN_PASSWORD_HASH={}", hash_password(&password));
    println!();
    if generated {
        println!("  ⚠️  Save this password! Only its digest is stored.");
        println!();
    }
    println!("════════════════════════════════════════════════════════════════");
    println!();
}

/// Two random v4 UUIDs, hex encoded.
fn generate_password() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

fn print_usage() {
    eprintln!();
    eprintln!("Usage: hash-admin-password [password]");
    eprintln!();
    eprintln!("Prints the SHA-256 digest to use as BLOG_ADMIN_PASSWORD_HASH.");
    eprintln!("Without a password, a random one is generated and printed.");
    eprintln!();
}
