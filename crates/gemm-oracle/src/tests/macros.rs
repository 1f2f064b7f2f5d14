/// Generates one test per case of the default suite, for each listed element type.
///
/// Expects a `TestEngine` type implementing `MatmulEngine + Default` in scope.
///
/// ```ignore
/// type TestEngine = MyEngine;
/// gemm_oracle::testgen_matmul_oracle!(f32: f32, f16: half::f16);
/// ```
#[macro_export]
macro_rules! testgen_matmul_oracle {
    ($($name: ident: $elem: ty),* $(,)?) => {
        mod dynamic_shape {
            use super::*;

            $crate::testgen_matmul_oracle_elem!(Dynamic, $($name: $elem),*);
        }

        mod static_shape {
            use super::*;

            $crate::testgen_matmul_oracle_elem!(Static, $($name: $elem),*);
        }
    };
}

#[macro_export]
macro_rules! testgen_matmul_oracle_elem {
    ($mode: ident, $($name: ident: $elem: ty),*) => {
        $(
            mod $name {
                use super::*;

                $crate::testgen_matmul_oracle_problem!($mode, $elem);
            }
        )*
    };
}

/// One module per entry of [GENERATED_SIZES](crate::tests::GENERATED_SIZES).
#[macro_export]
macro_rules! testgen_matmul_oracle_problem {
    ($mode: ident, $elem: ty) => {
        mod g3x3x3 {
            use super::*;
            $crate::testgen_matmul_oracle_transforms!($mode, $elem, $crate::tests::GENERATED_SIZES[0]);
        }

        mod g3x3x5 {
            use super::*;
            $crate::testgen_matmul_oracle_transforms!($mode, $elem, $crate::tests::GENERATED_SIZES[1]);
        }

        mod g3x5x3 {
            use super::*;
            $crate::testgen_matmul_oracle_transforms!($mode, $elem, $crate::tests::GENERATED_SIZES[2]);
        }

        mod g3x5x5 {
            use super::*;
            $crate::testgen_matmul_oracle_transforms!($mode, $elem, $crate::tests::GENERATED_SIZES[3]);
        }

        mod g5x3x3 {
            use super::*;
            $crate::testgen_matmul_oracle_transforms!($mode, $elem, $crate::tests::GENERATED_SIZES[4]);
        }

        mod g5x3x5 {
            use super::*;
            $crate::testgen_matmul_oracle_transforms!($mode, $elem, $crate::tests::GENERATED_SIZES[5]);
        }

        mod g5x5x3 {
            use super::*;
            $crate::testgen_matmul_oracle_transforms!($mode, $elem, $crate::tests::GENERATED_SIZES[6]);
        }

        mod g5x5x5 {
            use super::*;
            $crate::testgen_matmul_oracle_transforms!($mode, $elem, $crate::tests::GENERATED_SIZES[7]);
        }
    };
}

/// One test per entry of [GENERATED_ARGS](crate::tests::GENERATED_ARGS): the lhs is
/// never transposed, the rhs is used as is or transposed.
#[macro_export]
macro_rules! testgen_matmul_oracle_transforms {
    ($mode: ident, $elem: ty, $size: expr) => {
        #[test]
        pub fn lhs_none_rhs_none() {
            $crate::tests::test_matmul_case::<TestEngine, $elem>(
                $crate::ShapeMode::$mode,
                $size,
                $crate::tests::GENERATED_ARGS[0],
            );
        }

        #[test]
        pub fn lhs_none_rhs_transpose() {
            $crate::tests::test_matmul_case::<TestEngine, $elem>(
                $crate::ShapeMode::$mode,
                $size,
                $crate::tests::GENERATED_ARGS[1],
            );
        }
    };
}
