//! Function calls: parameter passing, conversions, recursion, and the
//! function-order index used by `call` (`spec.md` §4.3, "Function call").
#[path = "support.rs"]
mod support;

use support::*;

#[test]
fn call_target_uses_function_order_not_constant_slot() {
    let program = compile(
        "int main(){return g();} int f(){return 1;} int g(){return f();}",
    );
    // declaration order in the constant table: main(0), f(1), g(2)
    // function-order (functions only, in the same order): main=0, f=1, g=2
    let main = ops(&func(&program, 0).instructions);
    assert_eq!(main[0], op("call", 2, 0)); // call g

    let g = ops(&func(&program, 2).instructions);
    assert_eq!(g[0], op("call", 1, 0)); // call f
}

#[test]
fn argument_is_converted_to_the_declared_parameter_type() {
    let program = compile("double f(double x){return x;} int main(){double d = f(1); return 0;}");
    let main = ops(&func(&program, 1).instructions);
    // `1` (int literal) converted to double before the call
    assert_eq!(main[0], op("ipush", 1, 0));
    assert_eq!(main[1], bare(c0c::instruction::Operation::I2d));
    assert_eq!(main[2], op("call", 0, 0));
}

#[test]
fn recursive_call_is_allowed() {
    let program = compile("int fact(int n){if(n<=1){return 1;} return n*fact(n-1);}int main(){return fact(5);}");
    let fact = ops(&func(&program, 0).instructions);
    assert!(fact.iter().any(|i| i.0 == "call"));
}

#[test]
fn const_parameter_cannot_be_reassigned() {
    let err = compile_err("void f(const int a){a = 1;} int main(){return 0;}");
    assert_eq!(err.kind, c0c::error::ErrorKind::AssignToConst("a".into()));
}
