use std::collections::BTreeSet;

use chrono::NaiveDate;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Select, TransactionTrait,
};
use tracing::debug;

use crate::entities::{employee, menu, vote};

use super::{
    ALREADY_VOTED_FOR_MENU, ALREADY_VOTED_TODAY, CHOICES_NOT_DISTINCT, EMPLOYEE_NOT_VALID,
    MENU_NOT_FOUND, VoteError, conflict_or_database,
};

pub const SINGLE_CHOICE_POINTS: i32 = 1;

/// Points awarded to the first, second and third choice of a ranked ballot.
pub const RANKED_POINTS: [i32; 3] = [3, 2, 1];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleChoiceBallot {
    pub menu_id: i32,
    /// Absent ids are reported after the menu lookup.
    pub employee_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedChoiceBallot {
    pub employee_id: i32,
    pub voted_date: NaiveDate,
    /// Menu ids ordered first choice to third choice.
    pub choices: [i32; 3],
}

/// A ranked ballot must name three different menus.
pub fn ensure_distinct_choices(choices: &[i32; 3]) -> Result<(), VoteError> {
    let unique = choices.iter().collect::<BTreeSet<_>>();
    if unique.len() != choices.len() {
        return Err(VoteError::validation(CHOICES_NOT_DISTINCT));
    }
    Ok(())
}

/// A vote submission, already resolved to one of the two protocols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ballot {
    SingleChoice(SingleChoiceBallot),
    RankedChoice(RankedChoiceBallot),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receipt {
    /// Single-choice vote stored.
    Recorded(vote::Model),
    /// All three ranked votes stored.
    Created(Vec<vote::Model>),
}

impl Receipt {
    pub fn voted_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Recorded(vote) => Some(vote.voted_date),
            Self::Created(votes) => votes.first().map(|vote| vote.voted_date),
        }
    }
}

pub async fn cast<C>(db: &C, ballot: &Ballot, today: NaiveDate) -> Result<Receipt, VoteError>
where
    C: TransactionTrait,
{
    match ballot {
        Ballot::SingleChoice(single) => cast_single(db, single, today)
            .await
            .map(Receipt::Recorded),
        Ballot::RankedChoice(ranked) => cast_ranked(db, ranked).await.map(Receipt::Created),
    }
}

/// Records one 1-point vote for `today`, bumping the menu's advisory counter
/// in the same transaction.
pub async fn cast_single<C>(
    db: &C,
    ballot: &SingleChoiceBallot,
    today: NaiveDate,
) -> Result<vote::Model, VoteError>
where
    C: TransactionTrait,
{
    let txn = db.begin().await?;

    if !menu_exists(&txn, ballot.menu_id).await? {
        return Err(VoteError::NotFound(MENU_NOT_FOUND.to_string()));
    }
    let employee_id = ballot
        .employee_id
        .ok_or_else(|| VoteError::InvalidInput(EMPLOYEE_NOT_VALID.to_string()))?;
    lock_employee(&txn, employee_id).await?;

    let prior_votes = vote::Entity::find()
        .filter(vote::Column::MenuId.eq(ballot.menu_id))
        .filter(vote::Column::EmployeeId.eq(employee_id))
        .filter(vote::Column::VotedDate.eq(today))
        .count(&txn)
        .await?;
    if prior_votes > 0 {
        return Err(VoteError::Conflict(ALREADY_VOTED_FOR_MENU.to_string()));
    }

    menu::Entity::update_many()
        .col_expr(menu::Column::Votes, Expr::col(menu::Column::Votes).add(1))
        .filter(menu::Column::Id.eq(ballot.menu_id))
        .exec(&txn)
        .await?;

    let record = vote::ActiveModel {
        id: NotSet,
        menu_id: Set(ballot.menu_id),
        employee_id: Set(employee_id),
        points: Set(SINGLE_CHOICE_POINTS),
        voted_date: Set(today),
        rank: Set(None),
    }
    .insert(&txn)
    .await
    .map_err(|err| conflict_or_database(err, ALREADY_VOTED_FOR_MENU))?;

    txn.commit().await?;
    debug!(
        "Single-choice vote {} stored for menu {} by employee {}",
        record.id, record.menu_id, record.employee_id
    );
    Ok(record)
}

/// Records a ranked ballot as three votes worth 3, 2 and 1 points. Either all
/// three rows commit or none do.
pub async fn cast_ranked<C>(
    db: &C,
    ballot: &RankedChoiceBallot,
) -> Result<Vec<vote::Model>, VoteError>
where
    C: TransactionTrait,
{
    ensure_distinct_choices(&ballot.choices)?;

    let txn = db.begin().await?;
    lock_employee(&txn, ballot.employee_id).await?;

    let votes_that_day = vote::Entity::find()
        .filter(vote::Column::EmployeeId.eq(ballot.employee_id))
        .filter(vote::Column::VotedDate.eq(ballot.voted_date))
        .count(&txn)
        .await?;
    if votes_that_day > 0 {
        return Err(VoteError::Conflict(ALREADY_VOTED_TODAY.to_string()));
    }

    for menu_id in ballot.choices {
        if !menu_exists(&txn, menu_id).await? {
            return Err(VoteError::NotFound(MENU_NOT_FOUND.to_string()));
        }
    }

    let mut records = Vec::with_capacity(ballot.choices.len());
    for (position, (menu_id, points)) in ballot.choices.into_iter().zip(RANKED_POINTS).enumerate() {
        let record = vote::ActiveModel {
            id: NotSet,
            menu_id: Set(menu_id),
            employee_id: Set(ballot.employee_id),
            points: Set(points),
            voted_date: Set(ballot.voted_date),
            rank: Set(Some(position as i16 + 1)),
        }
        .insert(&txn)
        .await
        .map_err(|err| conflict_or_database(err, ALREADY_VOTED_TODAY))?;
        records.push(record);
    }

    txn.commit().await?;
    debug!(
        "Ranked ballot stored for employee {} on {}",
        ballot.employee_id, ballot.voted_date
    );
    Ok(records)
}

async fn menu_exists<C: ConnectionTrait>(db: &C, menu_id: i32) -> Result<bool, VoteError> {
    let found = menu::Entity::find_by_id(menu_id).count(db).await?;
    Ok(found > 0)
}

/// Row lock on the voting employee. Concurrent ballots from the same employee
/// queue here, so the per-day vote count read afterwards stays accurate until
/// commit. SQLite has no row locks and serialises writers instead.
fn employee_for_update(employee_id: i32) -> Select<employee::Entity> {
    employee::Entity::find_by_id(employee_id).lock_exclusive()
}

async fn lock_employee<C: ConnectionTrait>(db: &C, employee_id: i32) -> Result<(), VoteError> {
    employee_for_update(employee_id)
        .one(db)
        .await?
        .ok_or_else(|| VoteError::InvalidInput(EMPLOYEE_NOT_VALID.to_string()))?;
    Ok(())
}
