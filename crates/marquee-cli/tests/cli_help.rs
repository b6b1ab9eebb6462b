use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("marquee")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("watchlist"))
        .stdout(predicate::str::contains("movies"))
        .stdout(predicate::str::contains("rate"))
        .stdout(predicate::str::contains("profile"));
}

#[test]
fn test_watchlist_help_shows_subcommands() {
    cargo_bin_cmd!("marquee")
        .args(["watchlist", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("remove"));
}

#[test]
fn test_login_requires_email() {
    cargo_bin_cmd!("marquee")
        .arg("login")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--email"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("marquee")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("marquee"));
}
