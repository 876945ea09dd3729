#![allow(missing_docs)]

use std::sync::Arc;

use sombra_criteria::criteria::{
    BasicRenderingContext, ComparisonOp, InMemoryMetamodel, ParameterRegistry, QueryTree,
    Renderable, Selection,
};

fn tree() -> QueryTree {
    let model = InMemoryMetamodel::builder()
        .entity("Order", |t| {
            t.singular("total", "Long")
                .singular("code", "String")
                .singular("customer", "Customer")
        })
        .entity("Customer", |t| t.singular("name", "String"))
        .build()
        .expect("valid metamodel");
    QueryTree::new(Arc::new(model))
}

#[test]
fn compound_projection_collects_each_parameter_once() {
    let mut tree = tree();
    let order = tree.root_with_alias("Order", "o").unwrap();
    let total = tree.get(order, "total").unwrap();
    let name = tree.get_dotted(order, "customer.name").unwrap();
    let prefix = tree.parameter(Some("prefix"), "String");
    let scale = tree.parameter(None, "Long");
    let concat = tree.function("concat", vec![prefix.into(), name.into()]).unwrap();
    let scaled = tree.function("mul", vec![total.into(), scale.into()]).unwrap();
    let rescaled = tree.function("abs", vec![scaled.into()]).unwrap();

    let selections = vec![
        Selection::raw("count(*)"),
        Selection::compound(vec![
            Selection::from(concat),
            Selection::from(total),
            Selection::compound(vec![Selection::from(scaled), Selection::from(prefix)]),
        ]),
        Selection::from(rescaled),
    ];

    let registry = tree.collect_parameters(&selections).unwrap();
    assert_eq!(registry.ids(), vec![prefix, scale]);

    let names: Vec<_> = registry.iter().map(|p| p.name().map(str::to_owned)).collect();
    assert_eq!(names, vec![Some("prefix".to_owned()), None]);
}

#[test]
fn linear_tree_registers_its_single_parameter() {
    let mut tree = tree();
    let order = tree.root("Order").unwrap();
    let code = tree.get(order, "code").unwrap();
    let param = tree.parameter(Some("code"), "String");
    let eq = tree.comparison(ComparisonOp::Eq, code, param).unwrap();
    let wrapped = tree.and(vec![eq.into()]).unwrap();
    let outer = tree.or(vec![wrapped.into()]).unwrap();

    let mut registry = ParameterRegistry::new();
    tree.register_parameters(outer.into(), &mut registry).unwrap();
    assert_eq!(registry.ids(), vec![param]);
}

#[test]
fn branching_tree_registers_in_left_to_right_order() {
    let mut tree = tree();
    let order = tree.root("Order").unwrap();
    let total = tree.get(order, "total").unwrap();
    let code = tree.get(order, "code").unwrap();
    let low = tree.parameter(Some("low"), "Long");
    let high = tree.parameter(Some("high"), "Long");
    let codes = tree.parameter(Some("code"), "String");

    let above = tree.comparison(ComparisonOp::Ge, total, low).unwrap();
    let below = tree.comparison(ComparisonOp::Le, total, high).unwrap();
    let range = tree.and(vec![above.into(), below.into()]).unwrap();
    let by_code = tree.comparison(ComparisonOp::Eq, code, codes).unwrap();
    let again = tree.comparison(ComparisonOp::Ne, total, low).unwrap();
    let either = tree.or(vec![by_code.into(), range.into(), again.into()]).unwrap();

    let registry = tree.collect_parameters(&[Selection::from(either)]).unwrap();
    assert_eq!(registry.ids(), vec![codes, low, high]);
}

#[test]
fn paths_and_literals_contribute_nothing() {
    let mut tree = tree();
    let order = tree.root("Order").unwrap();
    let total = tree.get(order, "total").unwrap();
    let type_of = tree.type_expression(order).unwrap();
    let one = tree.literal(1i64);
    let cmp = tree.comparison(ComparisonOp::Gt, total, one).unwrap();

    let registry = tree
        .collect_parameters(&[
            Selection::from(total),
            Selection::from(type_of),
            Selection::from(cmp),
        ])
        .unwrap();
    assert!(registry.is_empty());
}

#[test]
fn unnamed_parameters_render_with_stable_placeholders() {
    let mut tree = tree();
    let order = tree.root_with_alias("Order", "o").unwrap();
    let total = tree.get(order, "total").unwrap();
    let first = tree.parameter(None, "Long");
    let second = tree.parameter(None, "Long");
    let named = tree.parameter(Some("cap"), "Long");
    let a = tree.comparison(ComparisonOp::Gt, total, first).unwrap();
    let b = tree.comparison(ComparisonOp::Lt, total, second).unwrap();
    let c = tree.comparison(ComparisonOp::Ne, total, first).unwrap();
    let d = tree.comparison(ComparisonOp::Le, total, named).unwrap();
    let all = tree.and(vec![a.into(), b.into(), c.into(), d.into()]).unwrap();

    let mut ctx = BasicRenderingContext::new();
    let rendered = Selection::from(all).render(&tree, &mut ctx).unwrap();
    assert_eq!(
        rendered,
        "( o.total > :param0 and o.total < :param1 and o.total <> :param0 and o.total <= :cap )"
    );
}

#[test]
fn empty_junctions_render_identities() {
    let mut tree = tree();
    let none = tree.and(Vec::new()).unwrap();
    let never = tree.or(Vec::new()).unwrap();

    let mut ctx = BasicRenderingContext::new();
    assert_eq!(tree.render(none.into(), &mut ctx).unwrap(), "1=1");
    assert_eq!(tree.render(never.into(), &mut ctx).unwrap(), "0=1");
    assert!(tree
        .collect_parameters(&[Selection::from(none), Selection::from(never)])
        .unwrap()
        .is_empty());
}
