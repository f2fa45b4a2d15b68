use std::io;
use std::process::ExitCode;

use tbhdr::errmsg::report_error;
use tbhdr::fitsio::SZ_FITS_STR;
use tbhdr::resolver::{resolve_comment_reported, resolve_value};
use tbhdr::table::TableHandle;

fn usage() {
    println!("Usage:  tbhgcm [-v] file[ext] keyword [maxch]");
    println!();
    println!("Print the comment of a header keyword following the tables");
    println!("convention: HISTORY, COMMENT and blank keywords have no comment.");
    println!("With -v the keyword value is printed on the line before it.");
    println!();
    println!("Examples:");
    println!();
    println!("tbhgcm in.fits[1] DATE-OBS        (comment in the first extension)");
    println!("tbhgcm in.fits[events] EXPTIME 8  (at most 8 characters)");
    println!("tbhgcm -v in.fits HISTORY         (HISTORY text, empty comment)");
}

pub fn main() -> ExitCode {
    env_logger::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let show_value = match args.first() {
        Some(flag) if flag == "-v" => {
            args.remove(0);
            true
        }
        _ => false,
    };

    if args.len() < 2 || args.len() > 3 {
        usage();
        return ExitCode::from(0);
    }

    let maxch = match args.get(2).map(|s| s.parse::<usize>()) {
        None => SZ_FITS_STR,
        Some(Ok(n)) => n,
        Some(Err(_)) => {
            eprintln!("tbhgcm: maxch must be a non-negative integer: {}", args[2]);
            return ExitCode::from(2);
        }
    };

    let mut table = match TableHandle::open(&args[0], 0) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("tbhgcm: {e}");
            return ExitCode::from(1);
        }
    };
    let keyword = &args[1];

    if show_value {
        match resolve_value(&mut table, keyword, maxch) {
            Ok(value) => println!("{value}"),
            Err(e) => {
                let _ = report_error(&mut io::stderr(), e.status(), table.errors_mut());
                return ExitCode::from(1);
            }
        }
    }

    let resolved = resolve_comment_reported(&mut table, keyword, maxch);
    println!("{}", resolved.comment);

    match resolved.error {
        Some(e) => {
            let _ = report_error(&mut io::stderr(), e.status(), table.errors_mut());
            ExitCode::from(1)
        }
        None => ExitCode::from(0),
    }
}
