//! Command-line front-end: compile a pattern, match it against a text,
//! report the result and the match time.

use std::process::ExitCode;
use std::time::Instant;

use linrex::Pattern;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <pattern> <text>", args[0]);
        return ExitCode::FAILURE;
    }
    let (pattern, text) = (&args[1], &args[2]);

    let compiled = match Pattern::compile(pattern) {
        Ok(compiled) => compiled,
        Err(err) => {
            eprintln!("Error: cannot compile pattern '{}': {}", pattern, err);
            return ExitCode::FAILURE;
        }
    };

    let started = Instant::now();
    let matched = compiled.is_match(text);
    let elapsed = started.elapsed();

    println!("Pattern: {}", pattern);
    println!("Text:    {}", text);
    println!(
        "Result:  {}",
        if matched { "matched" } else { "not matched" }
    );
    println!("Time:    {:.9} seconds", elapsed.as_secs_f64());

    if matched {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
