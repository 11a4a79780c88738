// Drives the compiled binary through a PTY: real event loop, crossterm
// input and terminal setup/teardown.
//
// Requires a TTY, so it is Unix-only and ignored by default.
// Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_session_stops_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("typeclock");
    let cmd = format!("{} -p hi --offline --no-log -s 15", bin.display());

    let mut p = spawn(cmd)?;

    // let the fetch thread deliver the prompt
    std::thread::sleep(Duration::from_millis(300));

    p.send("hi")?;
    std::thread::sleep(Duration::from_millis(200));

    // first ESC stops the running test, second one quits from results
    p.send("\x1b")?;
    std::thread::sleep(Duration::from_millis(200));
    p.send("\x1b")?;

    p.expect(Eof)?;
    Ok(())
}

#[test]
#[ignore]
fn ctrl_c_quits_while_waiting() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("typeclock");
    let cmd = format!("{} -p hello --no-log", bin.display());

    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(300));

    p.send("\x03")?;
    p.expect(Eof)?;
    Ok(())
}
