use budget_repo::transaction_repo::NewTransaction;
use chrono::NaiveDate;
use fake::faker::company::en::CompanyName;
use fake::{Fake, Faker};
use rust_decimal::Decimal;
use std::collections::HashSet;

pub trait Generator<T> {
    fn gen(&mut self) -> T;
}

pub struct Predefined<T> {
    values: Vec<T>,
    current_pos: usize,
}

impl<T> Predefined<T> {
    pub fn boxed(values: Vec<T>) -> Box<Predefined<T>> {
        Box::new(Predefined {
            values,
            current_pos: 0,
        })
    }
}

impl<T: Clone> Generator<T> for Predefined<T> {
    fn gen(&mut self) -> T {
        let v = self.values[self.current_pos % self.values.len()].clone();
        self.current_pos += 1;
        v
    }
}

pub struct FakeGenerator<F: Fake> {
    fake: F,
}

impl<F: Fake> FakeGenerator<F> {
    pub fn boxed(fake: F) -> Box<FakeGenerator<F>> {
        Box::new(FakeGenerator { fake })
    }
}

impl<T: fake::Dummy<F>, F> Generator<T> for FakeGenerator<F> {
    fn gen(&mut self) -> T {
        self.fake.fake()
    }
}

/// Amounts in cents between -1000.00 and 1000.00, never zero.
pub struct FakeAmount;

impl Generator<Decimal> for FakeAmount {
    fn gen(&mut self) -> Decimal {
        let cents: i64 = (1i64..100_000).fake();
        let sign = if Faker.fake::<bool>() { 1 } else { -1 };
        Decimal::new(sign * cents, 2)
    }
}

/// Labels look like bank statement lines: an uppercased company name.
pub struct FakeLabel;

impl Generator<String> for FakeLabel {
    fn gen(&mut self) -> String {
        let company: String = CompanyName().fake();
        format!("CARTE {}", company.to_uppercase())
    }
}

/// Untagged transactions with fake labels and amounts.
pub struct NewTransactionGenerator {
    label_gen: Box<dyn Generator<String>>,
    date_gen: Box<dyn Generator<NaiveDate>>,
    amnt_gen: Box<dyn Generator<Decimal>>,
}

#[allow(dead_code)]
impl NewTransactionGenerator {
    pub fn with_dates(mut self, dates: Vec<NaiveDate>) -> NewTransactionGenerator {
        self.date_gen = Predefined::boxed(dates);
        self
    }

    pub fn generate(&mut self) -> NewTransaction {
        NewTransaction::new(
            self.label_gen.gen(),
            self.amnt_gen.gen(),
            self.date_gen.gen(),
            HashSet::new(),
            None,
        )
    }

    pub fn generate_many(&mut self, count: usize) -> Vec<NewTransaction> {
        let mut vec = Vec::with_capacity(count);
        for _ in 0..count {
            vec.push(self.generate())
        }
        vec
    }
}

impl Default for NewTransactionGenerator {
    fn default() -> Self {
        NewTransactionGenerator {
            label_gen: Box::new(FakeLabel),
            date_gen: FakeGenerator::boxed(Faker),
            amnt_gen: Box::new(FakeAmount),
        }
    }
}

#[allow(dead_code)]
pub fn generate_new_transaction() -> NewTransaction {
    NewTransactionGenerator::default().generate()
}

#[allow(dead_code)]
pub fn generate_new_transaction_with_date(date: NaiveDate) -> NewTransaction {
    NewTransactionGenerator::default()
        .with_dates(vec![date])
        .generate()
}
