//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use rulegraph_validator::prelude::*;

// ============================================================================
// PEOPLE
// ============================================================================

pub struct Person {
    pub name: String,
    pub age: i32,
    pub phones: Vec<Phone>,
    pub emails: Vec<Option<Email>>,
    pub address: Option<Address>,
}

pub struct Phone {
    pub number: String,
    pub country_code: String,
}

pub struct Email {
    pub address: String,
}

pub struct Address {
    pub street: String,
    pub city: Option<City>,
}

pub struct City {
    pub name: String,
    pub zip: String,
}

impl BusinessObject for Person {}
impl BusinessObject for Phone {}
impl BusinessObject for Email {}
impl BusinessObject for Address {}
impl BusinessObject for City {}

impl Person {
    pub fn new(name: &str, age: i32, phones: Vec<Phone>) -> Self {
        Self {
            name: name.into(),
            age,
            phones,
            emails: Vec::new(),
            address: None,
        }
    }
}

impl Phone {
    pub fn new(number: &str, country_code: &str) -> Self {
        Self {
            number: number.into(),
            country_code: country_code.into(),
        }
    }
}

pub fn email(address: &str) -> Option<Email> {
    Some(Email {
        address: address.into(),
    })
}

/// `Person("John", 35, [Phone("123456789", "+11"), Phone("987654321", "-22")])`
pub fn john() -> Person {
    Person::new(
        "John",
        35,
        vec![
            Phone::new("123456789", "+11"),
            Phone::new("987654321", "-22"),
        ],
    )
}

pub fn phone_builder() -> Builder<Phone> {
    Builder::<Phone>::new()
        .add_rule("numberValid", "number has 9 digits", |p| {
            p.number.len() == 9 && p.number.chars().all(|c| c.is_ascii_digit())
        })
        .add_rule("countryCodeValid", "country code starts with +", |p| {
            p.country_code.starts_with('+')
        })
}

pub fn email_builder() -> Builder<Email> {
    Builder::<Email>::new().add_rule("addressValid", "address contains @", |e| {
        basic::matches(r"[^@\s]+@[^@\s]+", Some(e.address.as_str())).unwrap_or(false)
    })
}

pub fn city_builder() -> Builder<City> {
    Builder::<City>::new()
        .add_rule("nameSet", "name is set", |c| basic::is_defined(Some(c.name.as_str())))
        .add_rule("zipValid", "zip has 5 digits", |c| {
            c.zip.len() == 5 && c.zip.chars().all(|ch| ch.is_ascii_digit())
        })
}

pub fn address_builder() -> Builder<Address> {
    Builder::<Address>::new()
        .add_rule("streetSet", "street is set", |a| basic::is_defined(Some(a.street.as_str())))
        .add_member("city", |a| MemberValue::optional(a.city.as_ref()), &city_builder())
}

/// `ageValid`, `NameNotEmpty`, and a `phones` member.
pub fn person_builder() -> Builder<Person> {
    Builder::<Person>::new()
        .add_rule("ageValid", "age is between 0 and 150", |p| (0..=150).contains(&p.age))
        .add_rule("NameNotEmpty", "name is not empty", |p| basic::is_defined(Some(p.name.as_str())))
        .add_member("phones", |p| MemberValue::many(&p.phones), &phone_builder())
}

/// [`person_builder`] plus `emails` and `address`.
pub fn full_person_builder() -> Builder<Person> {
    person_builder()
        .add_member("emails", |p| MemberValue::many_optional(p.emails.iter().map(Option::as_ref)), &email_builder())
        .add_member("address", |p| MemberValue::optional(p.address.as_ref()), &address_builder())
}

// ============================================================================
// SHAPES
// ============================================================================

pub struct Shape {
    pub label: String,
}

pub struct Square {
    pub shape: Shape,
    pub side: u32,
}

pub struct Rectangle {
    pub square: Square,
    pub height: u32,
}

pub struct Circle {
    pub shape: Shape,
    pub radius: u32,
}

pub struct Triangle {
    pub shape: Shape,
}

/// A drawing holding shapes of any kind.
pub struct Graphic {
    pub shapes: Vec<Box<DynObject>>,
    pub main: Option<Box<DynObject>>,
}

impl BusinessObject for Shape {}

impl BusinessObject for Square {
    fn supertype(&self) -> Option<&DynObject> {
        Some(&self.shape)
    }
}

impl BusinessObject for Rectangle {
    fn supertype(&self) -> Option<&DynObject> {
        Some(&self.square)
    }
}

impl BusinessObject for Circle {
    fn supertype(&self) -> Option<&DynObject> {
        Some(&self.shape)
    }
}

impl BusinessObject for Triangle {
    fn supertype(&self) -> Option<&DynObject> {
        Some(&self.shape)
    }
}

impl BusinessObject for Graphic {}

pub fn shape(label: &str) -> Shape {
    Shape {
        label: label.into(),
    }
}

pub fn square(side: u32) -> Square {
    Square {
        shape: shape("square"),
        side,
    }
}

pub fn rectangle(side: u32, height: u32) -> Rectangle {
    Rectangle {
        square: Square {
            shape: shape("rectangle"),
            side,
        },
        height,
    }
}

pub fn circle(radius: u32) -> Circle {
    Circle {
        shape: shape("circle"),
        radius,
    }
}

pub fn triangle() -> Triangle {
    Triangle {
        shape: shape("triangle"),
    }
}

pub fn square_builder() -> Builder<Square> {
    Builder::<Square>::new().add_rule("sideValid", "side is positive", |s| s.side > 0)
}

pub fn rectangle_builder() -> Builder<Rectangle> {
    Builder::<Rectangle>::new()
        .add_rule("heightValid", "height is positive", |r| r.height > 0)
        .add_rule("notSquare", "height differs from side", |r| r.height != r.square.side)
}

pub fn circle_builder() -> Builder<Circle> {
    Builder::<Circle>::new().add_rule("radiusValid", "radius is positive", |c| c.radius > 0)
}

pub fn shape_builder() -> Builder<Shape> {
    Builder::<Shape>::new().add_rule("labelSet", "label is set", |s| !s.label.is_empty())
}

pub fn graphic_builder(candidates: Candidates) -> Builder<Graphic> {
    Builder::<Graphic>::new()
        .add_member("shapes", |g| MemberValue::many(g.shapes.iter().map(|shape| &**shape)), candidates.clone())
        .add_member("main", |g| MemberValue::optional(g.main.as_deref()), candidates)
}

// ============================================================================
// LINKED OBJECTS
// ============================================================================

/// Singly linked through shared pointers, so cycles are possible.
pub struct Link {
    pub value: i32,
    pub next: RefCell<Option<Rc<Link>>>,
}

impl BusinessObject for Link {}

impl Link {
    pub fn new(value: i32) -> Rc<Self> {
        Rc::new(Self {
            value,
            next: RefCell::new(None),
        })
    }

    pub fn point_to(&self, next: &Rc<Self>) {
        *self.next.borrow_mut() = Some(Rc::clone(next));
    }

    /// Breaks a cycle so the test does not leak.
    pub fn unlink(&self) {
        self.next.borrow_mut().take();
    }
}

/// `positive` and `even` rules, `next` recursing into itself.
pub fn link_builder() -> Builder<Link> {
    let builder = Builder::<Link>::new();
    builder
        .add_rule("positive", "value is positive", |l| l.value > 0)
        .add_rule("even", "value is even", |l| l.value % 2 == 0)
        .add_member("next", |l| MemberValue::optional(l.next.borrow().clone()), &builder)
}

/// Owned chain, acyclic by construction.
pub struct Chain {
    pub value: usize,
    pub next: Option<Box<Chain>>,
}

impl BusinessObject for Chain {}

pub fn chain(length: usize) -> Chain {
    let mut head = Chain {
        value: 0,
        next: None,
    };
    for value in 1..length {
        head = Chain {
            value,
            next: Some(Box::new(head)),
        };
    }
    head
}

pub fn chain_builder() -> Builder<Chain> {
    let builder = Builder::<Chain>::new();
    builder
        .add_rule("small", "value below 1000", |c| c.value < 1000)
        .add_member("next", |c| MemberValue::optional(c.next.as_deref()), &builder)
}
