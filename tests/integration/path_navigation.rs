#![allow(missing_docs)]

use std::sync::Arc;

use sombra_criteria::criteria::{
    render_order_by, BasicRenderingContext, CollectionType, ComparisonOp, CriteriaError,
    InMemoryMetamodel, Order, PathKind, QueryTree, Renderable, Selection,
};

fn shop() -> Arc<InMemoryMetamodel> {
    let model = InMemoryMetamodel::builder()
        .entity("Order", |t| {
            t.singular("id", "Long")
                .singular("total", "Long")
                .singular("customer", "Customer")
                .singular("shipping", "Address")
                .collection("lines", CollectionType::List, "OrderLine")
                .map("notes", "String", "String")
        })
        .entity("Customer", |t| {
            t.singular("name", "String").singular("address", "Address")
        })
        .entity("OrderLine", |t| t.singular("qty", "Integer"))
        .embeddable("Address", |t| t.singular("city", "String").singular("zip", "String"))
        .build()
        .expect("valid metamodel");
    Arc::new(model)
}

#[test]
fn dotted_chain_renders_through_generated_alias() {
    let mut tree = QueryTree::new(shop());
    let order = tree.root("Order").expect("root");
    let city = tree
        .get_dotted(order, "customer.address.city")
        .expect("navigate");

    let mut ctx = BasicRenderingContext::new();
    let rendered = tree.render(city.into(), &mut ctx).expect("render");
    assert_eq!(rendered, "generatedAlias0.customer.address.city");
    assert_eq!(ctx.aliases_generated(), 1);

    // The alias sticks; a second pass reuses it.
    let again = tree.render(city.into(), &mut ctx).expect("render");
    assert_eq!(again, rendered);
    assert_eq!(ctx.aliases_generated(), 1);
}

#[test]
fn roots_are_aliased_in_encounter_order() {
    let mut tree = QueryTree::new(shop());
    let order = tree.root("Order").expect("root");
    let customer = tree.root("Customer").expect("root");
    let name = tree.get(customer, "name").expect("name");
    let total = tree.get(order, "total").expect("total");

    let mut ctx = BasicRenderingContext::new();
    assert_eq!(tree.render(name.into(), &mut ctx).unwrap(), "generatedAlias0.name");
    assert_eq!(tree.render(total.into(), &mut ctx).unwrap(), "generatedAlias1.total");
}

#[test]
fn where_clause_over_explicit_alias() {
    let mut tree = QueryTree::new(shop());
    let order = tree.root_with_alias("Order", "o").expect("root");
    let total = tree.get(order, "total").expect("total");
    let city = tree.get_dotted(order, "shipping.city").expect("city");
    let hundred = tree.literal(100i64);
    let paris = tree.literal("Paris");
    let big = tree.comparison(ComparisonOp::Gt, total, hundred).unwrap();
    let local = tree.comparison(ComparisonOp::Eq, city, paris).unwrap();
    let both = tree.and(vec![big.into(), local.into()]).unwrap();

    let mut ctx = BasicRenderingContext::new();
    assert_eq!(
        tree.render(both.into(), &mut ctx).unwrap(),
        "( o.total > 100 and o.shipping.city = 'Paris' )"
    );
    assert_eq!(ctx.aliases_generated(), 0);
}

#[test]
fn collection_paths_cannot_be_dereferenced() {
    let mut tree = QueryTree::new(shop());
    let order = tree.root_with_alias("Order", "o").expect("root");
    let lines = tree.get(order, "lines").expect("lines");
    assert!(tree.path(lines).unwrap().is_collection());
    assert!(!tree.can_be_dereferenced(lines).unwrap());

    let before = tree.path_count();
    let err = tree.get(lines, "qty").unwrap_err();
    assert!(matches!(err, CriteriaError::IllegalDereference { .. }));
    assert_eq!(
        err.to_string(),
        "Illegal attempt to dereference path source [o.lines]"
    );
    assert_eq!(tree.path_count(), before);
    assert_eq!(tree.path(lines).unwrap().child_count(), 0);
}

#[test]
fn basic_leaf_rejects_further_navigation() {
    let mut tree = QueryTree::new(shop());
    let order = tree.root_with_alias("Order", "o").expect("root");
    let city = tree.get_dotted(order, "customer.address.city").unwrap();
    assert!(!tree.can_be_dereferenced(city).unwrap());

    let err = tree.get_dotted(order, "customer.address.city.length").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Illegal attempt to dereference path source [o.customer.address.city]"
    );
}

#[test]
fn map_paths_expose_key_and_value_types() {
    let mut tree = QueryTree::new(shop());
    let order = tree.root("Order").expect("root");
    let notes = tree.get(order, "notes").expect("notes");
    let node = tree.path(notes).unwrap();
    assert!(matches!(node.kind(), PathKind::Map(_)));
    assert!(node.is_collection());
    assert_eq!(node.map_key_type(), Some("String"));
    assert_eq!(node.java_type(), "String");
    assert!(tree.get(notes, "anything").is_err());
}

#[test]
fn unknown_attribute_names_the_path_when_not_a_root() {
    let mut tree = QueryTree::new(shop());
    let order = tree.root_with_alias("Order", "o").expect("root");

    let err = tree.get(order, "nope").unwrap_err();
    assert_eq!(err.to_string(), "Unable to resolve attribute [nope] against path");
    assert!(err.is_navigation_error());

    let customer = tree.get(order, "customer").unwrap();
    let err = tree.get(customer, "nope").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unable to resolve attribute [nope] against path [o.customer]"
    );
}

#[test]
fn repeated_navigation_returns_the_same_node() {
    let mut tree = QueryTree::new(shop());
    let order = tree.root("Order").expect("root");
    let first = tree.get_dotted(order, "customer.address").unwrap();
    let count = tree.path_count();
    let second = tree.get_dotted(order, "customer.address").unwrap();
    assert_eq!(first, second);
    assert_eq!(tree.path_count(), count);

    // Different branches from the same parent are distinct nodes.
    let shipping = tree.get(order, "shipping").unwrap();
    let customer = tree.get(order, "customer").unwrap();
    assert_ne!(shipping, customer);
    assert_eq!(tree.path(order).unwrap().child_count(), 2);
    assert_eq!(tree.path_source(first).unwrap(), Some(customer));
}

#[test]
fn type_expression_is_stable_and_renders_identifier() {
    let mut tree = QueryTree::new(shop());
    let order = tree.root_with_alias("Order", "o").expect("root");
    let customer = tree.get(order, "customer").unwrap();
    let first = tree.type_expression(customer).unwrap();
    let second = tree.type_expression(customer).unwrap();
    assert_eq!(first, second);

    let mut ctx = BasicRenderingContext::new();
    assert_eq!(tree.render(first.into(), &mut ctx).unwrap(), "type(o.customer)");
    assert_eq!(
        Selection::from(first).render_projection(&tree, &mut ctx).unwrap(),
        "type(o.customer)"
    );
}

#[test]
fn order_by_list_follows_direction_flags() {
    let mut tree = QueryTree::new(shop());
    let order = tree.root_with_alias("Order", "o").expect("root");
    let total = tree.get(order, "total").unwrap();
    let name = tree.get_dotted(order, "customer.name").unwrap();

    let mut orders = vec![Order::desc(total), Order::new(name)];
    let mut ctx = BasicRenderingContext::new();
    assert_eq!(
        render_order_by(&tree, &orders, &mut ctx).unwrap(),
        "o.total desc, o.customer.name asc"
    );

    for order in &mut orders {
        order.reverse();
    }
    assert_eq!(
        render_order_by(&tree, &orders, &mut ctx).unwrap(),
        "o.total asc, o.customer.name desc"
    );
}

#[test]
fn handles_from_another_tree_are_rejected() {
    let mut big = QueryTree::new(shop());
    let order = big.root("Order").unwrap();
    let city = big.get_dotted(order, "customer.address.city").unwrap();

    let mut small = QueryTree::new(shop());
    small.root("Order").unwrap();
    let err = small.get(city, "x").unwrap_err();
    assert!(matches!(err, CriteriaError::UnknownNode { .. }));
    assert_eq!(err.code(), "UnknownNode");
}

#[test]
fn roots_require_entities() {
    let mut tree = QueryTree::new(shop());
    assert!(matches!(
        tree.root("Address"),
        Err(CriteriaError::UnknownManagedType { .. })
    ));
    assert!(tree.root("Missing").is_err());
    assert_eq!(tree.path_count(), 0);
}
