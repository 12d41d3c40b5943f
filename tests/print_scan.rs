//! `print`/`scan` statements (`spec.md` §4.3).
#[path = "support.rs"]
mod support;

use support::*;

#[test]
fn print_list_separates_printables_with_a_space_and_ends_with_printl() {
    let program = compile(r#"int main(){int x = 1; print(x, 'c', "hi"); return 0;}"#);
    let main = ops(&func(&program, 0).instructions);

    // x: loada/iload/iprint, then a separator (bipush 32/cprint) before
    // each subsequent printable, then the final printl.
    let iprint_pos = main.iter().position(|i| i.0 == "iprint").unwrap();
    let sep_positions: Vec<usize> = main
        .iter()
        .enumerate()
        .filter(|(_, i)| i.0 == "bipush" && i.1 == 32)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(sep_positions.len(), 2, "two separators between three printables");
    assert!(sep_positions[0] > iprint_pos);
    assert_eq!(main.last().unwrap().0, "printl");

    let char_pos = main.iter().position(|i| i.0 == "bipush" && i.1 == 'c' as i64).unwrap();
    assert_eq!(main[char_pos + 1].0, "cprint");

    assert!(main.iter().any(|i| i.0 == "loadc"));
    assert!(main.iter().any(|i| i.0 == "sprint"));
}

#[test]
fn string_literals_are_interned_once_per_distinct_value() {
    let program = compile(r#"int main(){print("x"); print("x"); print("y"); return 0;}"#);
    let strings: Vec<_> = program
        .constants
        .symbols()
        .iter()
        .filter(|s| !s.is_function)
        .map(|s| s.name.clone())
        .collect();
    assert_eq!(strings, vec!["x".to_string(), "y".to_string()]);
}

#[test]
fn scan_into_a_local_emits_load_address_scan_and_store() {
    let program = compile("int main(){int x; scan(x); return x;}");
    let main = ops(&func(&program, 0).instructions);
    assert_eq!(main[0], op("snew", 1, 0));
    assert_eq!(main[1], op("loada", 0, 0));
    assert_eq!(main[2].0, "iscan");
    assert_eq!(main[3].0, "istore");
}

#[test]
fn scan_into_a_global_uses_level_diff_zero_in_start_code_but_one_in_a_function() {
    let program = compile("int g; void read_g(){scan(g);} int main(){read_g(); return g;}");
    let read_g = ops(&func(&program, 0).instructions);
    assert_eq!(read_g[0], op("loada", 1, 0));
}

#[test]
fn double_scan_stores_with_dscan_and_dstore() {
    let program = compile("int main(){double d; scan(d); return 0;}");
    let main = ops(&func(&program, 0).instructions);
    assert!(main.iter().any(|i| i.0 == "dscan"));
    assert!(main.iter().any(|i| i.0 == "dstore"));
}
