//! Validates a small address book and prints the report.
//!
//! Run with `RUST_LOG=rulegraph_validator=trace` to watch the traversal.

use rulegraph_validator::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

struct Person {
    name: String,
    age: i32,
    phones: Vec<Phone>,
    friend: Option<Box<Person>>,
}

struct Phone {
    number: String,
    country_code: String,
}

impl BusinessObject for Person {}
impl BusinessObject for Phone {}

impl Describe for Person {
    fn describe(builder: &Builder<Self>, catalog: &Catalog) {
        builder
            .add_rule("ageValid", "age is between 0 and 150", |p| (0..=150).contains(&p.age))
            .add_rule("NameNotEmpty", "name is not empty", |p| {
                basic::is_defined(Some(p.name.as_str()))
            })
            .add_member("phones", |p| MemberValue::many(&p.phones), &catalog.builder::<Phone>())
            .add_member(
                "friend",
                |p| MemberValue::optional(p.friend.as_deref()),
                &catalog.builder::<Person>(),
            );
    }
}

impl Describe for Phone {
    fn describe(builder: &Builder<Self>, _catalog: &Catalog) {
        let digits = basic::FullMatch::new("[0-9]{9}").ok();
        builder
            .add_rule("numberValid", "number has 9 digits", move |p| {
                digits.as_ref().is_some_and(|re| re.is_match(Some(p.number.as_str())))
            })
            .add_rule("countryCodeValid", "country code starts with +", |p| {
                p.country_code.starts_with('+')
            });
    }
}

fn phone(number: &str, country_code: &str) -> Phone {
    Phone {
        number: number.into(),
        country_code: country_code.into(),
    }
}

fn main() -> rulegraph_validator::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let validator = validator_for::<Person>()?;

    let john = Person {
        name: "John".into(),
        age: 35,
        phones: vec![phone("123456789", "+11"), phone("987654321", "-22")],
        friend: Some(Box::new(Person {
            name: "Ann".into(),
            age: 160,
            phones: Vec::new(),
            friend: None,
        })),
    };

    let report = validator.validate(&john)?;
    print!("{report}");

    println!();
    println!("{} of {} checks failed:", report.invalid_rules().len(), report.test_count());
    for rule in report.invalid_rules() {
        println!("  {rule}");
    }

    if let Some(rule) = report.rule_result("Person.phones[1] [countryCodeValid]")? {
        println!();
        println!("second phone: {rule}");
    }

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("\n{json}"),
        Err(error) => eprintln!("report could not be serialized: {error}"),
    }

    Ok(())
}
