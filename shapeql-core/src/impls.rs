use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use crate::{
    Def, Leaf, ListDef, OptionDef, Peek, Poke, Reflect, ReflectList, ReflectOption, ReflectScalar,
    ScalarError, Selection, Shape,
};

crate::impl_scalar!(
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    serde_json::Value,
);

// Strings are the one scalar that discriminators are read from.

impl Selection for String {
    const SHAPE: &'static Shape = &Shape {
        type_identifier: "String",
        def: Def::Scalar,
    };
}

impl Reflect for String {
    fn shape(&self) -> &'static Shape {
        Self::SHAPE
    }

    fn peek(&self) -> Peek<'_> {
        Peek::Scalar(self)
    }

    fn poke(&mut self) -> Poke<'_> {
        Poke::Scalar(self)
    }

    fn reset(&mut self) {
        self.clear();
    }
}

impl ReflectScalar for String {
    fn set_leaf(&mut self, leaf: &Leaf<'_>) -> Result<(), ScalarError> {
        match leaf {
            Leaf::String(s) => {
                self.clear();
                self.push_str(s);
                Ok(())
            }
            other => {
                *self = other.deserialize()?;
                Ok(())
            }
        }
    }

    fn as_str(&self) -> Option<&str> {
        Some(self)
    }
}

impl<T: Selection> Selection for Option<T> {
    const SHAPE: &'static Shape = &const {
        Shape {
            type_identifier: "Option",
            def: Def::Option(OptionDef { inner: T::SHAPE }),
        }
    };
}

impl<T: Selection> Reflect for Option<T> {
    fn shape(&self) -> &'static Shape {
        Self::SHAPE
    }

    fn peek(&self) -> Peek<'_> {
        Peek::Option(self.as_ref().map(|v| v as &dyn Reflect))
    }

    fn poke(&mut self) -> Poke<'_> {
        Poke::Option(self)
    }

    fn reset(&mut self) {
        *self = None;
    }
}

impl<T: Selection> ReflectOption for Option<T> {
    fn inner_shape(&self) -> &'static Shape {
        T::SHAPE
    }

    fn value(&self) -> Option<&dyn Reflect> {
        self.as_ref().map(|v| v as &dyn Reflect)
    }

    fn value_mut(&mut self) -> Option<&mut dyn Reflect> {
        self.as_mut().map(|v| v as &mut dyn Reflect)
    }

    fn get_or_insert_default(&mut self) -> &mut dyn Reflect {
        self.get_or_insert_with(T::default)
    }

    fn set_none(&mut self) {
        *self = None;
    }
}

impl<T: Selection> Selection for Vec<T> {
    const SHAPE: &'static Shape = &const {
        Shape {
            type_identifier: "Vec",
            def: Def::List(ListDef { item: T::SHAPE }),
        }
    };
}

impl<T: Selection> Reflect for Vec<T> {
    fn shape(&self) -> &'static Shape {
        Self::SHAPE
    }

    fn peek(&self) -> Peek<'_> {
        Peek::List(self)
    }

    fn poke(&mut self) -> Poke<'_> {
        Poke::List(self)
    }

    fn reset(&mut self) {
        *self = Vec::new();
    }
}

impl<T: Selection> ReflectList for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn item(&self, index: usize) -> Option<&dyn Reflect> {
        self.get(index).map(|v| v as &dyn Reflect)
    }

    fn item_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.get_mut(index).map(|v| v as &mut dyn Reflect)
    }

    fn push_default(&mut self) -> usize {
        self.push(T::default());
        Vec::len(self) - 1
    }

    fn clear(&mut self) {
        *self = Vec::new();
    }
}

// Boxes are transparent: same shape, same views as their contents.

impl<T: Selection> Selection for Box<T> {
    const SHAPE: &'static Shape = T::SHAPE;
}

impl<T: Selection> Reflect for Box<T> {
    fn shape(&self) -> &'static Shape {
        T::SHAPE
    }

    fn peek(&self) -> Peek<'_> {
        (**self).peek()
    }

    fn poke(&mut self) -> Poke<'_> {
        (**self).poke()
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}
