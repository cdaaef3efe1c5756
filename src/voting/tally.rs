use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};

use crate::entities::{menu, vote};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuStanding {
    pub menu_id: i32,
    pub total_points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyWinner {
    pub menu: menu::Model,
    pub total_points: i64,
}

/// Point totals per menu for `date`, highest first. Equal totals are ordered
/// by ascending menu id.
pub async fn daily_standings<C>(db: &C, date: NaiveDate) -> Result<Vec<MenuStanding>, DbErr>
where
    C: ConnectionTrait,
{
    let rows = standings_query(date)
        .into_tuple::<(i32, i64)>()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(menu_id, total_points)| MenuStanding {
            menu_id,
            total_points,
        })
        .collect())
}

/// The leading menu for `date`, or `None` when nobody has voted that day.
pub async fn daily_winner<C>(db: &C, date: NaiveDate) -> Result<Option<DailyWinner>, DbErr>
where
    C: ConnectionTrait,
{
    let Some((menu_id, total_points)) = standings_query(date)
        .into_tuple::<(i32, i64)>()
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let menu = menu::Entity::find_by_id(menu_id)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("Menu {menu_id} vanished during tally")))?;

    Ok(Some(DailyWinner { menu, total_points }))
}

fn standings_query(date: NaiveDate) -> Select<vote::Entity> {
    vote::Entity::find()
        .select_only()
        .column(vote::Column::MenuId)
        .column_as(vote::Column::Points.sum(), "total_points")
        .filter(vote::Column::VotedDate.eq(date))
        .group_by(vote::Column::MenuId)
        .order_by_desc(vote::Column::Points.sum())
        .order_by_asc(vote::Column::MenuId)
}
