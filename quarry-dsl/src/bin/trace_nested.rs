/// Nested DSL Tracer - Shows how nested-relation text is parsed
///
/// Usage: cargo run --bin trace_nested [--strict] '<nested-dsl>'

use quarry_dsl::{
    parse_nested_flat_with, parse_nested_tree_with, pretty_print_nested, ParseOptions,
};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let strict = args.iter().any(|a| a == "--strict");
    let input = args.iter().find(|a| a.as_str() != "--strict");

    let Some(input) = input else {
        eprintln!("Usage: cargo run --bin trace_nested [--strict] '<nested-dsl>'");
        eprintln!();
        eprintln!("Example:");
        eprintln!("  cargo run --bin trace_nested 'author{{profile}},posts{{ {{\"limit\":5}}, comments }}'");
        std::process::exit(1);
    };

    let options = if strict {
        ParseOptions::strict()
    } else {
        ParseOptions::lenient()
    };

    println!("╔═══════════════════════════════════════════════════════════════");
    println!("║ NESTED DSL TRACER ({})", if strict { "strict" } else { "lenient" });
    println!("╚═══════════════════════════════════════════════════════════════\n");

    println!("📝 INPUT:");
    println!("{}", input);
    println!();

    match parse_nested_flat_with(input, &options) {
        Ok(paths) => {
            println!("📂 FLAT PATHS ({}):", paths.len());
            for path in &paths {
                println!("  {}", path);
            }
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
    println!();

    let tree = match parse_nested_tree_with(input, &options) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    println!("🌳 TREE:");
    match serde_json::to_string_pretty(&tree) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("❌ Failed to encode tree: {}", e),
    }
    println!();

    println!("🔁 PRETTY PRINTED:");
    println!("{}", pretty_print_nested(&tree));
}
