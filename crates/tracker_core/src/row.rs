use crate::status::DisplayStatus;

/// Number of fields in a row.
pub const FIELD_COUNT: usize = 9;

/// A single field of a shipment row.
///
/// Declaration order matches the canonical positional order of cells on the
/// wire (columns A through I of the sheet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Vin,
    Year,
    Make,
    Model,
    Pickup,
    Delivery,
    PickupEstimate,
    DeliveryEstimate,
    Status,
}

impl Field {
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::Vin,
        Field::Year,
        Field::Make,
        Field::Model,
        Field::Pickup,
        Field::Delivery,
        Field::PickupEstimate,
        Field::DeliveryEstimate,
        Field::Status,
    ];

    /// Fields that must all be non-empty for a row to be displayed.
    pub const KEY: [Field; 4] = [Field::Vin, Field::Year, Field::Make, Field::Model];

    /// Position of this field in a canonical row.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn is_key(self) -> bool {
        matches!(self, Field::Vin | Field::Year | Field::Make | Field::Model)
    }

    /// Column title used when displaying this field.
    pub const fn title(self) -> &'static str {
        match self {
            Field::Vin => "VIN",
            Field::Year => "Year",
            Field::Make => "Make",
            Field::Model => "Model",
            Field::Pickup => "Pickup",
            Field::Delivery => "Delivery",
            Field::PickupEstimate => "Est. Pickup",
            Field::DeliveryEstimate => "Est. Delivery",
            Field::Status => "Status",
        }
    }
}

/// One shipment record in canonical field order.
///
/// Missing cells are stored as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    cells: [String; FIELD_COUNT],
}

impl Row {
    /// Create a row from positional cells.
    ///
    /// Cells past the last field are ignored.
    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row = Row::default();
        for (slot, cell) in row.cells.iter_mut().zip(cells) {
            *slot = cell.into();
        }
        row
    }

    pub fn get(&self, field: Field) -> &str {
        &self.cells[field.index()]
    }

    pub(crate) fn set(&mut self, field: Field, value: impl Into<String>) {
        self.cells[field.index()] = value.into();
    }

    pub fn vin(&self) -> &str {
        self.get(Field::Vin)
    }

    /// A row is only displayed (and counted) if all key fields are present.
    pub fn is_displayable(&self) -> bool {
        Field::KEY.iter().all(|f| !self.get(*f).is_empty())
    }

    pub fn status(&self) -> DisplayStatus {
        DisplayStatus::from_code(self.get(Field::Status))
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<String> {
        self.cells.into()
    }
}
