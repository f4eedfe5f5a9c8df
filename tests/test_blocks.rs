extern crate riloc;
use riloc::{build_block, max_source_register, rename, Diagnostic, Instruction, Rename};
use std::path::Path;

// Log needs to be initialized once in the async mess that is cargo test
use std::sync::Once;
static LOGGER_INIT: Once = Once::new();

fn ensure_log_init() {
    LOGGER_INIT.call_once(|| {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .init()
    });
}

fn build_file(path: &Path) -> Result<Vec<Instruction>, Vec<Diagnostic>> {
    let source = std::fs::read_to_string(path).expect("could not load given file");
    build_block(&source)
}

fn build_safe(path: &Path) -> Vec<Instruction> {
    match build_file(path) {
        Ok(block) => block,
        Err(diagnostics) => {
            for diagnostic in &diagnostics {
                println!("{}", diagnostic);
            }
            panic!("file test failed to build");
        }
    }
}

#[test]
fn well_formed_scripts_build_and_rename() -> std::io::Result<()> {
    ensure_log_init();
    for entry in std::fs::read_dir("tests/scripts")? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            println!("TESTING: {}", path.to_string_lossy());
            let block = build_safe(&path);
            assert!(!block.is_empty());
            let bound = max_source_register(&block).unwrap_or(0);
            let renamed = rename(&block, bound);
            assert_eq!(renamed.len(), block.len());
            // every register operand got an annotation, nothing else did
            for (index, instruction) in block.iter().enumerate() {
                for (slot, operand) in instruction.operands().iter().enumerate() {
                    assert_eq!(
                        renamed.get(index, slot).is_some(),
                        operand.register_number().is_some(),
                        "instruction {} slot {}",
                        index,
                        slot
                    );
                }
            }
        }
    }
    Ok(())
}

// errors / ui
#[test]
fn error_scripts_match_expected_output() {
    ensure_log_init();
    for entry in std::fs::read_dir("tests/scripts/error").unwrap() {
        let entry = entry.unwrap();
        let path = entry.path();
        if path.is_file() && path.extension() == Some(std::ffi::OsStr::new("iloc")) {
            println!("TESTING: {}", path.to_string_lossy());
            let out_path = path.with_extension("stderr");
            let diagnostics = build_file(&path).expect_err("error example built without errors");
            let mut rendered = String::new();
            for diagnostic in &diagnostics {
                rendered.push_str(&diagnostic.to_string());
                rendered.push('\n');
            }
            let expected = std::fs::read_to_string(&out_path).unwrap();
            assert_eq!(rendered, expected, "for {}", path.to_string_lossy());
        }
    }
}

#[test]
fn renaming_the_simple_block_end_to_end() {
    ensure_log_init();
    let block = build_safe(Path::new("tests/scripts/simple.iloc"));
    assert_eq!(block.len(), 6);
    let bound = max_source_register(&block).expect("the block touches registers");
    assert_eq!(bound, 3);
    let renamed = rename(&block, bound);

    let stamp = |vr, next_use| Some(Rename { virtual_register: vr, next_use });
    // worked out by hand over tests/scripts/simple.iloc, scanning backward
    assert_eq!(renamed.get(0, 1), stamp(4, Some(2)));
    assert_eq!(renamed.get(1, 1), stamp(3, Some(3)));
    assert_eq!(renamed.get(2, 0), stamp(4, None));
    assert_eq!(renamed.get(2, 1), stamp(2, Some(3)));
    assert_eq!(renamed.get(3, 0), stamp(2, None));
    assert_eq!(renamed.get(3, 1), stamp(3, None));
    assert_eq!(renamed.get(3, 2), stamp(1, Some(4)));
    assert_eq!(renamed.get(4, 0), stamp(1, None));
    assert_eq!(renamed.get(4, 1), stamp(0, None));
    assert_eq!(renamed.get(5, 0), None);
    assert_eq!(renamed.virtual_registers(), 5);
}
