use boutique_app::{
    config::AppConfig,
    domain::orders::models::{OrderStatus, OrderUuid, StatusPatch},
};
use clap::{Args, Subcommand};
use uuid::Uuid;

use super::{open_session, render, require_user};

#[derive(Debug, Args)]
pub(crate) struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrdersSubcommand {
    /// List orders, newest first
    List(ListArgs),

    /// Cancel a pending or processing order
    Cancel(CancelArgs),

    /// Change an order's status, payment status or tracking number
    Status(StatusArgs),
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Also list the items of each order
    #[arg(long)]
    items: bool,
}

#[derive(Debug, Args)]
struct CancelArgs {
    /// Order id
    order_id: Uuid,
}

#[derive(Debug, Args)]
struct StatusArgs {
    /// Order id
    order_id: Uuid,

    /// New status (pending, processing, shipped, delivered, cancelled)
    #[arg(long)]
    status: Option<String>,

    /// New payment status
    #[arg(long)]
    payment_status: Option<String>,

    /// Carrier tracking number
    #[arg(long)]
    tracking_number: Option<String>,
}

impl StatusArgs {
    fn patch(&self) -> StatusPatch {
        StatusPatch {
            status: self.status.as_deref().map(OrderStatus::from),
            payment_status: self.payment_status.clone(),
            tracking_number: self.tracking_number.clone(),
        }
    }
}

pub(crate) async fn run(config: &AppConfig, command: OrdersCommand) -> Result<(), String> {
    let app = open_session(config).await?;
    let user = require_user(&app)?;

    match command.command {
        OrdersSubcommand::List(args) => {
            let orders = app
                .orders
                .refresh(Some(&user))
                .await
                .map_err(|error| format!("failed to list orders: {error}"))?;

            if orders.is_empty() {
                println!("no orders yet");
                return Ok(());
            }

            println!("{}", render::orders_table(&orders, app.currency));

            if args.items {
                for order in &orders {
                    println!("#{}", order.order_number);
                    for item in &order.items {
                        println!("  {} x {}", item.quantity, item.product_name());
                    }
                }
            }
        }
        OrdersSubcommand::Cancel(args) => {
            let message = app
                .orders
                .cancel(Some(&user), OrderUuid::from_uuid(args.order_id))
                .await
                .map_err(|error| format!("failed to cancel order: {error}"))?;

            println!("{message}");
        }
        OrdersSubcommand::Status(args) => {
            let patch = args.patch();

            if patch.is_empty() {
                return Err(
                    "nothing to update: pass --status, --payment-status or --tracking-number"
                        .to_string(),
                );
            }

            app.orders
                .update_status(Some(&user), OrderUuid::from_uuid(args.order_id), &patch)
                .await
                .map_err(|error| format!("failed to update order: {error}"))?;
        }
    }

    Ok(())
}
