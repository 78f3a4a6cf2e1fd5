//! Database seeder for Arta development and testing.
//!
//! Seeds the chart of accounts (including the designated cash and sales
//! accounts), mapped saving and loan types, sample members, and a few
//! marketplace products.
//!
//! Usage: cargo run --bin seeder

use std::collections::HashMap;
use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use arta_db::entities::{
    chart_of_accounts, loan_types, members, products, saving_types,
    sea_orm_active_enums::{AccountType, MemberStatus, SavingTypeKind},
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = arta_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding chart of accounts...");
    let accounts = seed_accounts(&db).await;

    println!("Seeding saving types...");
    seed_saving_types(&db, &accounts).await;

    println!("Seeding loan types...");
    seed_loan_types(&db, &accounts).await;

    println!("Seeding members...");
    seed_members(&db).await;

    println!("Seeding products...");
    seed_products(&db).await;

    println!("Seeding complete!");
}

/// Seeds the chart of accounts and returns account ids by number.
async fn seed_accounts(db: &DatabaseConnection) -> HashMap<&'static str, Uuid> {
    // (number, name, type, parent number)
    let accounts = [
        ("1-1000", "Assets", AccountType::Asset, None),
        ("1-1110", "Cash", AccountType::Asset, Some("1-1000")),
        (
            "1-1210",
            "Member Loan Receivables",
            AccountType::Asset,
            Some("1-1000"),
        ),
        ("2-1000", "Liabilities", AccountType::Liability, None),
        (
            "2-1110",
            "Principal Savings",
            AccountType::Liability,
            Some("2-1000"),
        ),
        (
            "2-1120",
            "Mandatory Savings",
            AccountType::Liability,
            Some("2-1000"),
        ),
        (
            "2-1130",
            "Voluntary Savings",
            AccountType::Liability,
            Some("2-1000"),
        ),
        ("3-1000", "Equity", AccountType::Equity, None),
        ("4-1000", "Revenue", AccountType::Revenue, None),
        (
            "4-1100",
            "Sales Revenue",
            AccountType::Revenue,
            Some("4-1000"),
        ),
        (
            "4-1200",
            "Loan Interest Income",
            AccountType::Revenue,
            Some("4-1000"),
        ),
        ("5-1000", "Expenses", AccountType::Expense, None),
    ];

    let mut ids: HashMap<&'static str, Uuid> = HashMap::new();
    let mut inserted = 0;

    for (number, name, account_type, parent) in accounts {
        let existing = chart_of_accounts::Entity::find()
            .filter(chart_of_accounts::Column::AccountNumber.eq(number))
            .one(db)
            .await
            .ok()
            .flatten();

        if let Some(account) = existing {
            ids.insert(number, account.id);
            continue;
        }

        let id = Uuid::new_v4();
        let now = Utc::now().into();
        let account = chart_of_accounts::ActiveModel {
            id: Set(id),
            account_number: Set(number.to_string()),
            name: Set(name.to_string()),
            account_type: Set(account_type),
            parent_id: Set(parent.and_then(|p| ids.get(p).copied())),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        if let Err(e) = account.insert(db).await {
            eprintln!("Failed to insert account {number}: {e}");
        } else {
            ids.insert(number, id);
            inserted += 1;
        }
    }

    println!("  Inserted {inserted} accounts");
    ids
}

/// Seeds saving types mapped to their liability accounts.
async fn seed_saving_types(db: &DatabaseConnection, accounts: &HashMap<&'static str, Uuid>) {
    let types = [
        ("Principal Saving", SavingTypeKind::Deposit, "2-1110"),
        ("Mandatory Saving", SavingTypeKind::Deposit, "2-1120"),
        ("Voluntary Saving", SavingTypeKind::Deposit, "2-1130"),
        (
            "Voluntary Saving Withdrawal",
            SavingTypeKind::Withdrawal,
            "2-1130",
        ),
    ];

    let mut inserted = 0;
    for (name, kind, account_number) in types {
        let existing = saving_types::Entity::find()
            .filter(saving_types::Column::Name.eq(name))
            .one(db)
            .await
            .ok()
            .flatten();
        if existing.is_some() {
            continue;
        }

        let now = Utc::now().into();
        let saving_type = saving_types::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            kind: Set(kind),
            account_id: Set(accounts.get(account_number).copied()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        if let Err(e) = saving_type.insert(db).await {
            eprintln!("Failed to insert saving type {name}: {e}");
        } else {
            inserted += 1;
        }
    }

    println!("  Inserted {inserted} saving types");
}

/// Seeds loan types mapped to the receivables account.
async fn seed_loan_types(db: &DatabaseConnection, accounts: &HashMap<&'static str, Uuid>) {
    let types = [("Regular Loan", "1.5"), ("Emergency Loan", "1.0")];

    let mut inserted = 0;
    for (name, rate) in types {
        let existing = loan_types::Entity::find()
            .filter(loan_types::Column::Name.eq(name))
            .one(db)
            .await
            .ok()
            .flatten();
        if existing.is_some() {
            continue;
        }

        let now = Utc::now().into();
        let loan_type = loan_types::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            monthly_interest_rate: Set(Decimal::from_str(rate).unwrap()),
            account_id: Set(accounts.get("1-1210").copied()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        if let Err(e) = loan_type.insert(db).await {
            eprintln!("Failed to insert loan type {name}: {e}");
        } else {
            inserted += 1;
        }
    }

    println!("  Inserted {inserted} loan types");
}

/// Seeds sample active members.
async fn seed_members(db: &DatabaseConnection) {
    let sample = [
        ("KOP-001", "Budi Santoso", "budi@example.com"),
        ("KOP-002", "Siti Aminah", "siti@example.com"),
        ("KOP-003", "Agus Wijaya", "agus@example.com"),
    ];

    let mut inserted = 0;
    for (number, name, email) in sample {
        let existing = members::Entity::find()
            .filter(members::Column::CooperativeNumber.eq(number))
            .one(db)
            .await
            .ok()
            .flatten();
        if existing.is_some() {
            continue;
        }

        let now = Utc::now();
        let member = members::ActiveModel {
            id: Set(Uuid::new_v4()),
            cooperative_number: Set(number.to_string()),
            name: Set(name.to_string()),
            email: Set(Some(email.to_string())),
            phone: Set(None),
            status: Set(MemberStatus::Active),
            joined_at: Set(now.date_naive()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        if let Err(e) = member.insert(db).await {
            eprintln!("Failed to insert member {number}: {e}");
        } else {
            inserted += 1;
        }
    }

    println!("  Inserted {inserted} members");
}

/// Seeds a few marketplace products.
async fn seed_products(db: &DatabaseConnection) {
    let sample = [
        ("Rice 5kg", "68000", 40),
        ("Cooking Oil 1L", "17500", 60),
        ("Sugar 1kg", "14500", 50),
    ];

    let mut inserted = 0;
    for (name, price, stock) in sample {
        let existing = products::Entity::find()
            .filter(products::Column::Name.eq(name))
            .one(db)
            .await
            .ok()
            .flatten();
        if existing.is_some() {
            continue;
        }

        let now = Utc::now().into();
        let product = products::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            price: Set(Decimal::from_str(price).unwrap()),
            stock: Set(stock),
            description: Set(None),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        if let Err(e) = product.insert(db).await {
            eprintln!("Failed to insert product {name}: {e}");
        } else {
            inserted += 1;
        }
    }

    println!("  Inserted {inserted} products");
}
