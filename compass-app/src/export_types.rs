use compass_app_lib::export_bindings;

pub fn main() {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("Usage: export-types <bindings.ts>");
        std::process::exit(1);
    };
    if let Err(why) = export_bindings(&path) {
        eprintln!("{why:?}");
        std::process::exit(1);
    }
    println!("Wrote compass bindings (live view, events, commands) to {path}");
}
