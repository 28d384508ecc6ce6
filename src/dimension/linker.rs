use super::{
    clamp_dimension, parse_dimension, AspectRatio, DerivationPolicy, DimensionPair, EditedField,
    CONVERSION_FALLBACK, LIVE_EDIT_FALLBACK,
};

/// Keeps the width and height fields consistent with the selected image.
///
/// User edits enter through the `on_*` methods and update [`EditedField`]
/// bookkeeping. Derived values are written through [`Self::write_derived`],
/// which never touches that bookkeeping and never calls back into the edit
/// methods, so a derived write cannot trigger another derivation.
pub struct DimensionLinker {
    aspect_ratio: Option<AspectRatio>,
    dimensions: DimensionPair,
    linked: bool,
    last_edited: EditedField,
    policy: DerivationPolicy,
    width_blank: bool,
    height_blank: bool,
}

impl DimensionLinker {
    pub fn new(dimensions: DimensionPair, linked: bool, policy: DerivationPolicy) -> Self {
        Self {
            aspect_ratio: None,
            dimensions,
            linked,
            last_edited: EditedField::Width,
            policy,
            width_blank: false,
            height_blank: false,
        }
    }

    pub fn dimensions(&self) -> DimensionPair {
        self.dimensions
    }

    pub fn aspect_ratio(&self) -> Option<AspectRatio> {
        self.aspect_ratio
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn last_edited(&self) -> EditedField {
        self.last_edited
    }

    /// Whether the field's text is empty. A blank field holds
    /// [`LIVE_EDIT_FALLBACK`] until something writes a value into it.
    pub fn is_blank(&self, field: EditedField) -> bool {
        match field {
            EditedField::Width => self.width_blank,
            EditedField::Height => self.height_blank,
        }
    }

    pub fn on_image_selected(&mut self, natural_width: u32, natural_height: u32) {
        self.aspect_ratio = AspectRatio::from_natural_size(natural_width, natural_height);
        log::debug!(
            "Aspect ratio of {}x{} image is {:?}",
            natural_width,
            natural_height,
            self.aspect_ratio.map(|ratio| ratio.value())
        );
        if self.linked {
            self.sync_from_driving_field();
        }
    }

    pub fn on_image_failed(&mut self) {
        self.aspect_ratio = None;
    }

    pub fn on_width_edited(&mut self, width: i64) {
        self.on_edited(EditedField::Width, width);
    }

    pub fn on_height_edited(&mut self, height: i64) {
        self.on_edited(EditedField::Height, height);
    }

    /// The raw text of a field changed.
    pub fn on_text_edited(&mut self, field: EditedField, text: &str) {
        self.on_edited(field, parse_dimension(text, LIVE_EDIT_FALLBACK));
        self.set_blank(field, text.is_empty());
    }

    pub fn on_link_toggled(&mut self) {
        self.linked = !self.linked;
        if self.linked {
            self.sync_from_driving_field();
        }
    }

    /// The field values as read when conversion starts: blank fields count
    /// as [`CONVERSION_FALLBACK`].
    pub fn requested_for_conversion(&self) -> (i64, i64) {
        let read = |field: EditedField, value: u32| {
            if self.is_blank(field) {
                CONVERSION_FALLBACK as i64
            } else {
                value as i64
            }
        };
        (
            read(EditedField::Width, self.dimensions.width()),
            read(EditedField::Height, self.dimensions.height()),
        )
    }

    /// Final dimensions to render at.
    ///
    /// Unlinked, the clamped request is returned as is. Linked with a known
    /// ratio, the driven field is recomputed from the driving one, replacing
    /// whatever stale value it held, and written back.
    pub fn resolve_for_conversion(
        &mut self,
        requested_width: i64,
        requested_height: i64,
    ) -> DimensionPair {
        let requested = DimensionPair::new(requested_width, requested_height);
        let Some(ratio) = self.aspect_ratio.filter(|_| self.linked) else {
            return requested;
        };
        let driving_field = self.driving_field();
        let driving_value = match driving_field {
            EditedField::Width => requested.width(),
            EditedField::Height => requested.height(),
        };
        self.dimensions.set(driving_field, driving_value);
        self.set_blank(driving_field, false);
        self.write_derived(ratio, driving_field.other(), driving_value);
        self.dimensions
    }

    fn on_edited(&mut self, field: EditedField, value: i64) {
        let value = clamp_dimension(value);
        self.dimensions.set(field, value);
        self.set_blank(field, false);
        self.last_edited = field;
        if !self.linked {
            return;
        }
        if let Some(ratio) = self.aspect_ratio {
            self.write_derived(ratio, field.other(), value);
        }
    }

    fn driving_field(&self) -> EditedField {
        match self.policy {
            DerivationPolicy::LastEdited => self.last_edited,
            DerivationPolicy::AlwaysFromWidth => EditedField::Width,
        }
    }

    fn sync_from_driving_field(&mut self) {
        let Some(ratio) = self.aspect_ratio else {
            return;
        };
        let driving_field = self.driving_field();
        let driving_value = match driving_field {
            EditedField::Width => self.dimensions.width(),
            EditedField::Height => self.dimensions.height(),
        };
        self.write_derived(ratio, driving_field.other(), driving_value);
    }

    fn write_derived(&mut self, ratio: AspectRatio, target: EditedField, source_value: u32) {
        let derived = ratio.derive(target, source_value);
        log::debug!("Derived {:?} {} from {}", target, derived, source_value);
        self.dimensions.set(target, derived);
        self.set_blank(target, false);
    }

    fn set_blank(&mut self, field: EditedField, blank: bool) {
        match field {
            EditedField::Width => self.width_blank = blank,
            EditedField::Height => self.height_blank = blank,
        }
    }
}
