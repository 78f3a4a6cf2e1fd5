//! Repository abstractions for data access.

pub mod account;
pub mod journal;
pub mod loan;
pub mod loan_type;
pub mod member;
pub mod product;
pub mod saving;
pub mod saving_type;

pub use account::AccountRepository;
pub use journal::JournalRepository;
pub use loan::LoanRepository;
pub use loan_type::LoanTypeRepository;
pub use member::MemberRepository;
pub use product::ProductRepository;
pub use saving::SavingRepository;
pub use saving_type::SavingTypeRepository;
