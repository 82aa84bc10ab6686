//! MongoDB Index Initialization
//!
//! Creates indexes for all collections on application startup. Uniqueness
//! rules (email, bar council number, appointment slots) are enforced here,
//! not in application code.

use mongodb::{bson::doc, options::IndexOptions, Database, IndexModel};
use tracing::info;

/// Reset tokens are valid for 10 minutes; the TTL index reaps them at expiry
const RESET_TOKEN_TTL: std::time::Duration = std::time::Duration::from_secs(0);

/// Initialize all MongoDB indexes
pub async fn initialize_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    info!("Initializing MongoDB indexes...");

    create_user_indexes(db).await?;
    create_appointment_indexes(db).await?;
    create_internship_indexes(db).await?;
    create_messaging_indexes(db).await?;
    create_notification_indexes(db).await?;
    create_reset_token_indexes(db).await?;

    info!("MongoDB indexes initialized successfully");
    Ok(())
}

async fn create_user_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let users = db.collection::<mongodb::bson::Document>("users");

    // Email lookup (unique)
    users
        .create_index(
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(IndexOptions::builder().unique(true).background(true).build())
                .build(),
        )
        .await?;

    // Bar council number (unique, sparse: advocates only)
    users
        .create_index(
            IndexModel::builder()
                .keys(doc! { "barCouncilNumber": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .sparse(true)
                        .background(true)
                        .build(),
                )
                .build(),
        )
        .await?;

    // Role + verification filtering (advocate listings, admin queues)
    users
        .create_index(
            IndexModel::builder()
                .keys(doc! { "role": 1, "verificationStatus": 1 })
                .options(IndexOptions::builder().background(true).build())
                .build(),
        )
        .await?;

    info!("Created indexes on users");
    Ok(())
}

async fn create_appointment_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let appointments = db.collection::<mongodb::bson::Document>("appointments");

    // Double-booking guard: one appointment per advocate per slot
    appointments
        .create_index(
            IndexModel::builder()
                .keys(doc! { "advocate": 1, "date": 1, "startTime": 1 })
                .options(IndexOptions::builder().unique(true).background(true).build())
                .build(),
        )
        .await?;

    // Caller-scoped listings
    appointments
        .create_index(
            IndexModel::builder()
                .keys(doc! { "client": 1, "status": 1 })
                .options(IndexOptions::builder().background(true).build())
                .build(),
        )
        .await?;

    appointments
        .create_index(
            IndexModel::builder()
                .keys(doc! { "advocate": 1, "status": 1 })
                .options(IndexOptions::builder().background(true).build())
                .build(),
        )
        .await?;

    info!("Created indexes on appointments");
    Ok(())
}

async fn create_internship_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let internships = db.collection::<mongodb::bson::Document>("internships");

    // Public listings filter on status
    internships
        .create_index(
            IndexModel::builder()
                .keys(doc! { "status": 1, "createdAt": -1 })
                .options(IndexOptions::builder().background(true).build())
                .build(),
        )
        .await?;

    // Owner listings
    internships
        .create_index(
            IndexModel::builder()
                .keys(doc! { "advocate": 1 })
                .options(IndexOptions::builder().background(true).build())
                .build(),
        )
        .await?;

    // Intern's applications
    internships
        .create_index(
            IndexModel::builder()
                .keys(doc! { "applications.intern": 1 })
                .options(IndexOptions::builder().background(true).build())
                .build(),
        )
        .await?;

    info!("Created indexes on internships");
    Ok(())
}

async fn create_messaging_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let conversations = db.collection::<mongodb::bson::Document>("conversations");

    // Caller's conversations, newest activity first
    conversations
        .create_index(
            IndexModel::builder()
                .keys(doc! { "participants": 1, "updatedAt": -1 })
                .options(IndexOptions::builder().background(true).build())
                .build(),
        )
        .await?;

    let messages = db.collection::<mongodb::bson::Document>("messages");

    // Conversation history, oldest first
    messages
        .create_index(
            IndexModel::builder()
                .keys(doc! { "conversation": 1, "createdAt": 1 })
                .options(IndexOptions::builder().background(true).build())
                .build(),
        )
        .await?;

    info!("Created indexes on conversations, messages");
    Ok(())
}

async fn create_notification_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let notifications = db.collection::<mongodb::bson::Document>("notifications");

    // Inbox queries: per-user, unread filter, newest first
    notifications
        .create_index(
            IndexModel::builder()
                .keys(doc! { "user": 1, "read": 1, "createdAt": -1 })
                .options(IndexOptions::builder().background(true).build())
                .build(),
        )
        .await?;

    info!("Created indexes on notifications");
    Ok(())
}

async fn create_reset_token_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let tokens = db.collection::<mongodb::bson::Document>("password_reset_tokens");

    // Hash lookup (unique)
    tokens
        .create_index(
            IndexModel::builder()
                .keys(doc! { "tokenHash": 1 })
                .options(IndexOptions::builder().unique(true).background(true).build())
                .build(),
        )
        .await?;

    // TTL index: auto-delete at expiresAt
    tokens
        .create_index(
            IndexModel::builder()
                .keys(doc! { "expiresAt": 1 })
                .options(
                    IndexOptions::builder()
                        .expire_after(RESET_TOKEN_TTL)
                        .background(true)
                        .build(),
                )
                .build(),
        )
        .await?;

    info!("Created indexes on password_reset_tokens");
    Ok(())
}
