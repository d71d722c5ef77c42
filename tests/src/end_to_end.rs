//! The six end-to-end WebAssembly execution scenarios.

use crate::utils::compile_and_run;

#[test]
fn arithmetic_addition() {
    let result = compile_and_run("capsule T { main<Function<Number>> = () -> 10 + 5 }");
    assert_eq!(result, 15);
}

#[test]
fn arithmetic_precedence_and_integer_division() {
    let result =
        compile_and_run("capsule T { main<Function<Number>> = () -> 10 * (5 - 1) + (8 / (23 - 5)) }");
    assert_eq!(result, 40);
}

#[test]
fn control_flow_branch_selection() {
    let result = compile_and_run(
        "capsule T { main<Function<Number>> = () -> { if (1 == 1) { return 4 } else { return 3 } } }",
    );
    assert_eq!(result, 4);
}

#[test]
fn literal_inlining_of_a_capsule_constant() {
    let result = compile_and_run(
        "capsule T { count<Number> = 11 main<Function<Number>> = () -> { return count + 1 } }",
    );
    assert_eq!(result, 12);
}

#[test]
fn calling_a_sibling_function() {
    let result = compile_and_run(
        "capsule T { main<Function<Number>> = () -> double(5) \
         double<Function<Number,Number>> = (x<Number>) -> x * 2 }",
    );
    assert_eq!(result, 10);
}

#[test]
fn recursive_fibonacci() {
    let result = compile_and_run(
        "capsule T { main<Function<Number>> = () -> fibonacci(10) \
         fibonacci<Function<Number,Number>> = (n<Number>) -> \
         { if (n <= 1) { return n } fibonacci(n-1) + fibonacci(n-2) } }",
    );
    assert_eq!(result, 55);
}
