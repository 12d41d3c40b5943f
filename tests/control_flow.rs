//! `if`/`else` back-patching and "definitely returns" propagation
//! (`spec.md` §4.3, "If-else"; §3 invariant "every function body ends with a
//! return instruction matching the declared type").
#[path = "support.rs"]
mod support;

use support::*;

#[test]
fn if_else_both_returning_needs_no_synthesised_return() {
    let program = compile("int choose(int a){if(a){return 1;}else{return 2;}}int main(){return choose(1);}");
    let choose = ops(&func(&program, 0).instructions);
    let returns = choose.iter().filter(|i| i.0 == "iret").count();
    assert_eq!(returns, 2, "one iret per branch, no synthesised third");
    assert_eq!(choose.last().unwrap().0, "iret");
}

#[test]
fn if_without_else_synthesises_trailing_return() {
    let program = compile("int pick(int a){if(a){return 1;}}int main(){return pick(0);}");
    let pick = ops(&func(&program, 0).instructions);
    // then-branch iret, plus a synthesised `ipush 0`/`iret` for the
    // fallthrough-when-false path.
    assert_eq!(pick.iter().filter(|i| i.0 == "iret").count(), 2);
    assert_eq!(pick[pick.len() - 2], op("ipush", 0, 0));
    assert_eq!(pick.last().unwrap().0, "iret");
}

#[test]
fn while_body_never_provably_returns_even_if_its_body_always_does() {
    // A `while` whose body always returns still needs a synthesised return
    // after the loop, since the loop may run zero times.
    let program = compile("int f(int a){while(a){return 1;}return 2;}int main(){return f(0);}");
    let f = ops(&func(&program, 0).instructions);
    assert_eq!(f.iter().filter(|i| i.0 == "iret").count(), 2);
}

#[test]
fn nested_if_in_both_branches_of_if_else() {
    let program = compile(
        "int f(int a, int b){if(a){if(b){return 1;}else{return 2;}}else{return 3;}}int main(){return f(1,1);}",
    );
    let f = ops(&func(&program, 0).instructions);
    assert_eq!(f.iter().filter(|i| i.0 == "iret").count(), 3);
}
