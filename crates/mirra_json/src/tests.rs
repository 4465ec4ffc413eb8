use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use mirra_reflect::ReflectError;
use mirra_reflect::info::{Property, SkipSerialize, TypeBuilder};
use mirra_reflect::registry::TypeRegistry;
use mirra_reflect::value::{Shared, Value, shared};

use crate::{JsonError, WriteOptions, from_text, to_text, to_text_with};

// -----------------------------------------------------------------------------
// Fixture types

#[derive(Default, Clone, PartialEq, Debug)]
struct Point {
    x: f64,
    y: f64,
}

#[derive(Default, Clone, PartialEq, Debug)]
struct Date {
    d: i32,
    m: i32,
    y: i32,
    place: Point,
}

#[derive(Default)]
struct Sample {
    date: Date,
    point: Option<Shared<Point>>,
    this: Option<Shared<Sample>>,
}

fn engine() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry
        .declare(
            TypeBuilder::object::<Point>("Point")
                .constructor(Point::default)
                .property(Property::read_write(
                    "x",
                    |p: &Point| p.x,
                    |p: &mut Point, v| p.x = v,
                ))
                .property(Property::read_write(
                    "y",
                    |p: &Point| p.y,
                    |p: &mut Point, v| p.y = v,
                )),
        )
        .unwrap();
    registry
        .declare(
            TypeBuilder::object::<Date>("Date")
                .constructor(Date::default)
                .property(Property::read_write(
                    "d",
                    |d: &Date| d.d,
                    |d: &mut Date, v| d.d = v,
                ))
                .property(Property::read_write(
                    "m",
                    |d: &Date| d.m,
                    |d: &mut Date, v| d.m = v,
                ))
                .property(Property::read_write(
                    "y",
                    |d: &Date| d.y,
                    |d: &mut Date, v| d.y = v,
                ))
                .property(Property::read_write(
                    "place",
                    |d: &Date| d.place.clone(),
                    |d: &mut Date, v| d.place = v,
                )),
        )
        .unwrap();
    registry
        .declare(
            TypeBuilder::object::<Sample>("Sample")
                .constructor(Sample::default)
                .property(Property::read_write(
                    "date",
                    |s: &Sample| s.date.clone(),
                    |s: &mut Sample, v| s.date = v,
                ))
                .property(Property::shared(
                    "point",
                    |s: &Sample| s.point.clone(),
                    |s: &mut Sample, v| s.point = v,
                ))
                .property(Property::shared(
                    "self",
                    |s: &Sample| s.this.clone(),
                    |s: &mut Sample, v| s.this = v,
                )),
        )
        .unwrap();
    registry
}

fn scenario_sample() -> Shared<Sample> {
    let sample = shared(Sample {
        date: Date {
            d: 1,
            m: 4,
            y: 2011,
            place: Point { x: 98.0, y: 93.0 },
        },
        point: Some(shared(Point { x: 45.0, y: 80.0 })),
        this: None,
    });
    sample.borrow_mut().this = Some(sample.clone());
    sample
}

// -----------------------------------------------------------------------------
// Writing

#[test]
fn cyclic_graph_serializes_in_bounded_form() {
    let registry = engine();
    let sample = scenario_sample();
    let text = to_text(&registry, &Value::pointer(sample.clone())).unwrap();

    // The root is expanded once under id 0.
    assert!(text.contains("\"$id\":\"0\""));
    // The by-value date and the pointed-to point each get a fresh id.
    assert!(text.contains("\"date\":{\"$type\":\"Date\",\"$id\":\"1\""));
    assert!(text.contains("\"point\":{\"$type\":\"Point\",\"$id\":\"3\""));
    // The self edge collapses to a reference, never a re-expansion.
    assert!(text.contains("\"self\":{\"$ref\":\"0\"}"));
    assert_eq!(text.matches("$ref").count(), 1);
    assert_eq!(text.matches("$id").count(), 4);

    // Keeping the cycle alive is the caller's business; break it here.
    sample.borrow_mut().this = None;
}

#[test]
fn aliased_targets_expand_once() {
    let mut registry = engine();
    declare_holder(&mut registry);

    // Two pointer properties aliasing the same cell.
    let target = shared(Point { x: 1.0, y: 2.0 });
    let holder = Holder {
        first: Some(target.clone()),
        second: Some(target),
    };

    let text = to_text(&registry, &Value::of(holder)).unwrap();
    assert_eq!(text.matches("\"x\":1").count(), 1, "{text}");
    assert_eq!(text.matches("$id").count(), 2);
    assert_eq!(text.matches("$ref").count(), 1);
}

#[derive(Default)]
struct Holder {
    first: Option<Shared<Point>>,
    second: Option<Shared<Point>>,
}

fn declare_holder(registry: &mut TypeRegistry) {
    registry
        .declare(
            TypeBuilder::object::<Holder>("Holder")
                .constructor(Holder::default)
                .property(Property::shared(
                    "first",
                    |h: &Holder| h.first.clone(),
                    |h: &mut Holder, v| h.first = v,
                ))
                .property(Property::shared(
                    "second",
                    |h: &Holder| h.second.clone(),
                    |h: &mut Holder, v| h.second = v,
                )),
        )
        .unwrap();
}

#[test]
fn null_pointers_render_as_the_null_literal() {
    let registry = engine();
    let text = to_text(&registry, &Value::of(Sample::default())).unwrap();
    assert!(text.contains("\"point\":NULL"));
    assert!(text.contains("\"self\":NULL"));
}

#[test]
fn compact_output_is_json_shaped() {
    let registry = engine();
    let sample = scenario_sample();
    let text = to_text(&registry, &Value::pointer(sample.clone())).unwrap();
    sample.borrow_mut().this = None;

    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["$type"], "Sample");
    assert_eq!(parsed["$id"], "0");
    assert_eq!(parsed["date"]["place"]["x"].as_f64(), Some(98.0));
    assert_eq!(parsed["point"]["y"].as_f64(), Some(80.0));
    assert_eq!(parsed["self"]["$ref"], "0");
}

#[test]
fn pretty_mode_round_trips() {
    let registry = engine();
    let sample = scenario_sample();
    let options = WriteOptions {
        pretty: true,
        type_tags: false,
    };
    let text = to_text_with(&registry, &Value::pointer(sample.clone()), &options).unwrap();
    sample.borrow_mut().this = None;
    assert!(text.contains("\n  "));
    assert!(!text.contains("$type"));

    let copy = shared(Sample::default());
    from_text(&registry, &mut Value::pointer(copy.clone()), &text).unwrap();
    assert_eq!(copy.borrow().date.y, 2011);
    copy.borrow_mut().this = None;
}

#[test]
fn skip_annotated_properties_are_excluded() {
    let mut registry = TypeRegistry::new();

    #[derive(Default)]
    struct Secretive {
        shown: i32,
        hidden: i32,
    }

    registry
        .declare(
            TypeBuilder::object::<Secretive>("Secretive")
                .constructor(Secretive::default)
                .property(Property::read_write(
                    "shown",
                    |s: &Secretive| s.shown,
                    |s: &mut Secretive, v| s.shown = v,
                ))
                .property(
                    Property::read_write(
                        "hidden",
                        |s: &Secretive| s.hidden,
                        |s: &mut Secretive, v| s.hidden = v,
                    )
                    .annotate(SkipSerialize),
                ),
        )
        .unwrap();

    let text = to_text(&registry, &Value::of(Secretive { shown: 1, hidden: 2 })).unwrap();
    assert!(text.contains("shown"));
    assert!(!text.contains("hidden"));
}

// -----------------------------------------------------------------------------
// Reading

#[test]
fn scenario_round_trip_preserves_identity() {
    let registry = engine();
    let sample = scenario_sample();
    let text = to_text(&registry, &Value::pointer(sample.clone())).unwrap();
    sample.borrow_mut().this = None;

    let copy = shared(Sample::default());
    from_text(&registry, &mut Value::pointer(copy.clone()), &text).unwrap();

    {
        let read = copy.borrow();
        assert_eq!(
            read.date,
            Date {
                d: 1,
                m: 4,
                y: 2011,
                place: Point { x: 98.0, y: 93.0 },
            }
        );
        assert_eq!(
            *read.point.as_ref().unwrap().borrow(),
            Point { x: 45.0, y: 80.0 }
        );
        // The read-back self edge aliases the freshly read instance
        // itself, not a new allocation.
        assert!(Rc::ptr_eq(read.this.as_ref().unwrap(), &copy));
    }
    copy.borrow_mut().this = None;
}

#[test]
fn shared_references_deserialize_to_one_cell() {
    let mut registry = engine();
    declare_holder(&mut registry);

    let target = shared(Point { x: 7.0, y: 8.0 });
    let holder = shared(Holder {
        first: Some(target.clone()),
        second: Some(target),
    });
    let text = to_text(&registry, &Value::pointer(holder)).unwrap();

    let copy = shared(Holder::default());
    from_text(&registry, &mut Value::pointer(copy.clone()), &text).unwrap();
    let read = copy.borrow();
    let first = read.first.as_ref().unwrap();
    let second = read.second.as_ref().unwrap();
    assert!(Rc::ptr_eq(first, second));
    assert_eq!(*first.borrow(), Point { x: 7.0, y: 8.0 });
}

#[test]
fn null_and_absent_properties_stay_untouched() {
    let registry = engine();
    let copy = shared(Sample {
        date: Date {
            d: 9,
            ..Date::default()
        },
        point: Some(shared(Point::default())),
        this: None,
    });
    // `point` becomes null, `date` is absent and keeps its value.
    from_text(
        &registry,
        &mut Value::pointer(copy.clone()),
        "{\"point\": NULL}",
    )
    .unwrap();
    let read = copy.borrow();
    assert!(read.point.is_none());
    assert_eq!(read.date.d, 9);
}

#[test]
fn string_escapes_round_trip_exactly() {
    let mut registry = TypeRegistry::new();

    #[derive(Default)]
    struct Tagged {
        text: String,
    }

    registry
        .declare(
            TypeBuilder::object::<Tagged>("Tagged")
                .constructor(Tagged::default)
                .property(Property::read_write(
                    "text",
                    |t: &Tagged| t.text.clone(),
                    |t: &mut Tagged, v| t.text = v,
                )),
        )
        .unwrap();

    let original = "Hello, \"world\"!\nLine2\u{11}";
    let text = to_text(
        &registry,
        &Value::of(Tagged {
            text: String::from(original),
        }),
    )
    .unwrap();
    assert!(text.contains("\\\""));
    assert!(text.contains("\\n"));
    assert!(text.contains("\\u0011"));

    let mut copy = Value::of(Tagged::default());
    from_text(&registry, &mut copy, &text).unwrap();
    assert_eq!(copy.take::<Tagged>().unwrap().text, original);
}

#[test]
fn collections_clear_then_refill_in_order() {
    let mut registry = TypeRegistry::new();
    registry.declare(TypeBuilder::vec_of::<f64>("Vec<f64>")).unwrap();

    #[derive(Default)]
    struct Data {
        values: Vec<f64>,
    }

    registry
        .declare(
            TypeBuilder::object::<Data>("Data")
                .constructor(Data::default)
                .property(Property::read_write(
                    "values",
                    |d: &Data| d.values.clone(),
                    |d: &mut Data, v| d.values = v,
                )),
        )
        .unwrap();

    let text = to_text(
        &registry,
        &Value::of(Data {
            values: alloc::vec![1.5, -2.0, 3.25],
        }),
    )
    .unwrap();
    assert!(text.contains("\"values\":[1.5,-2,3.25]"));

    let mut copy = Value::of(Data {
        values: alloc::vec![9.0, 9.0, 9.0, 9.0],
    });
    from_text(&registry, &mut copy, &text).unwrap();
    assert_eq!(copy.take::<Data>().unwrap().values, [1.5, -2.0, 3.25]);
}

#[test]
fn shared_collection_elements_keep_identity() {
    let mut registry = engine();
    registry
        .declare(TypeBuilder::vec_of_shared::<Point>("Vec<Point*>"))
        .unwrap();

    let cell = shared(Point { x: 5.0, y: 6.0 });
    let points: Vec<Shared<Point>> = alloc::vec![cell.clone(), cell];
    let text = to_text(&registry, &Value::of(points)).unwrap();
    assert_eq!(text.matches("$ref").count(), 1);

    let mut copy = Value::of(Vec::<Shared<Point>>::new());
    from_text(&registry, &mut copy, &text).unwrap();
    let read = copy.take::<Vec<Shared<Point>>>().unwrap();
    assert_eq!(read.len(), 2);
    assert!(Rc::ptr_eq(&read[0], &read[1]));
}

#[test]
fn read_only_keys_are_skipped_not_errors() {
    let mut registry = TypeRegistry::new();

    #[derive(Default)]
    struct Meter {
        level: i32,
    }

    registry
        .declare(
            TypeBuilder::object::<Meter>("Meter")
                .constructor(Meter::default)
                .property(Property::read_only("level", |m: &Meter| m.level)),
        )
        .unwrap();

    let mut copy = Value::of(Meter { level: 3 });
    from_text(&registry, &mut copy, "{\"level\": 42}").unwrap();
    assert_eq!(copy.take::<Meter>().unwrap().level, 3);
}

#[test]
fn malformed_input_fails_fast() {
    let registry = engine();

    let failures = [
        // Unexpected end of stream.
        "{\"date\":",
        // A $ref to an id nothing registered.
        "{\"point\":{\"$ref\":\"9\"}}",
        // A type discriminator naming an unrelated type.
        "{\"$type\":\"Point\"}",
        // An undeclared property.
        "{\"elsewhere\":1}",
        // A bad scalar literal.
        "{\"date\":{\"d\":\"not-a-number\"}}",
    ];
    for input in failures {
        let copy = shared(Sample::default());
        let result = from_text(&registry, &mut Value::pointer(copy), input);
        assert!(result.is_err(), "{input}");
    }

    let copy = shared(Sample::default());
    let err = from_text(
        &registry,
        &mut Value::pointer(copy),
        "{\"point\":{\"$ref\":\"9\"}}",
    )
    .unwrap_err();
    assert!(matches!(err, JsonError::MalformedInput { .. }));

    let copy = shared(Sample::default());
    let err = from_text(&registry, &mut Value::pointer(copy), "{\"elsewhere\":1}").unwrap_err();
    assert!(matches!(
        err,
        JsonError::Reflect(ReflectError::PropertyNotDeclared { .. })
    ));
}

#[test]
fn type_tags_accept_derived_types() {
    let mut registry = TypeRegistry::new();

    #[derive(Default)]
    struct Base {
        id: i64,
    }
    #[derive(Default)]
    struct Derived {
        base: Base,
    }

    registry
        .declare(
            TypeBuilder::object::<Base>("Base")
                .constructor(Base::default)
                .property(Property::read_write(
                    "id",
                    |b: &Base| b.id,
                    |b: &mut Base, v| b.id = v,
                )),
        )
        .unwrap();
    registry
        .declare(
            TypeBuilder::object::<Derived>("Derived")
                .constructor(Derived::default)
                .derives_from("Base", |d: &Derived| &d.base, |d: &mut Derived| {
                    &mut d.base
                }),
        )
        .unwrap();

    let mut target = Value::of(Base::default());
    from_text(&registry, &mut target, "{\"$type\":\"Derived\",\"id\":5}").unwrap();
    assert_eq!(target.take::<Base>().unwrap().id, 5);
}

#[test]
fn whitespace_and_commas_are_interchangeable_separators() {
    let registry = engine();
    let copy = shared(Sample::default());
    from_text(
        &registry,
        &mut Value::pointer(copy.clone()),
        "{ \"date\" : { \"d\" : 2 \"m\" : 3 , , \"y\" : 4 } }",
    )
    .unwrap();
    let read = copy.borrow();
    assert_eq!((read.date.d, read.date.m, read.date.y), (2, 3, 4));
}
